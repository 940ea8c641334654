//! Marketplace REST wire types.
//!
//! Backend-specific response structures. They are converted into the
//! domain types from gigloom-types before leaving this crate.

use chrono::{DateTime, NaiveDateTime, Utc};
use gigloom_types::chat::{ChatMessage, MessageId, ParticipantId, Profile, deserialize_flexible_id};
use gigloom_types::error::ApiError;
use serde::Deserialize;

/// The `{success, data, message|error}` wrapper most endpoints answer with.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into [`ApiError::Rejected`].
    pub fn into_data(self) -> Result<T, ApiError> {
        self.check()?;
        self.data
            .ok_or_else(|| ApiError::Deserialization("response has no data".to_string()))
    }

    /// Check the success flag only, ignoring any payload.
    pub fn check(&self) -> Result<(), ApiError> {
        if self.success {
            return Ok(());
        }
        let reason = self
            .error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "request was not successful".to_string());
        Err(ApiError::Rejected(reason))
    }
}

/// One stored message as returned by `GET /chats/chatrooms/{id}/messages/`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    pub content: String,
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub sender: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub timestamp: String,
}

impl MessageRecord {
    pub fn into_message(self) -> Result<ChatMessage, ApiError> {
        Ok(ChatMessage {
            id: MessageId::new(self.id),
            text: self.content,
            sender_id: ParticipantId::new(self.sender),
            sender_name: self.sender_name,
            created_at: parse_timestamp(&self.timestamp)?,
        })
    }
}

/// Body of `GET /accounts/get-my-info/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: Profile,
}

/// Parse a backend timestamp.
///
/// RFC 3339 first; timestamps without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::Deserialization(format!("invalid timestamp: {raw}")))
}
