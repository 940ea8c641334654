//! Chat domain types for Gigloom.
//!
//! Defines the identifiers, the `ChatMessage` timeline entry, the transport
//! `ConnectionState`, and the account-side `Profile` / `RoomSummary` shapes.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Prefix for ids the client assigns to live messages before the server
/// confirms them.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Identifier that the backend may send either as a JSON string or number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

/// Deserialize an identifier that may arrive as a string or an integer.
pub fn deserialize_flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserialize_flexible_id(deserializer).map(Self)
            }
        }
    };
}

string_id!(
    /// A chat room: scopes one socket connection and one history page.
    RoomId
);

string_id!(
    /// An authoring participant (user account id on the backend).
    ParticipantId
);

string_id!(
    /// Message identifier. Server-assigned for history, `local-*` for live
    /// messages synthesized on receipt.
    MessageId
);

impl MessageId {
    /// Generate a fresh client-side id (UUIDv7, so ids sort by creation time).
    pub fn local() -> Self {
        Self(format!("{LOCAL_ID_PREFIX}{}", Uuid::now_v7()))
    }

    /// Whether this id was assigned by the client rather than the server.
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }
}

/// One entry of a room's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub sender_id: ParticipantId,
    /// Display name of the sender. Only history records carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// Server time for history, local receipt time for live messages.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Synthesize a live message stamped with its local receipt time.
    pub fn live(
        text: impl Into<String>,
        sender_id: ParticipantId,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::local(),
            text: text.into(),
            sender_id,
            sender_name: None,
            created_at: received_at,
        }
    }

    /// Heuristic identity test: same text, same sender, and creation times
    /// strictly less than `window` apart.
    pub fn is_duplicate_of(&self, other: &ChatMessage, window: Duration) -> bool {
        if self.text != other.text || self.sender_id != other.sender_id {
            return false;
        }
        let delta = (self.created_at - other.created_at).abs();
        match delta.to_std() {
            Ok(delta) => delta < window,
            Err(_) => false,
        }
    }
}

/// Lifecycle of the room's realtime connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Handshake in flight.
    Connecting,
    /// Handshake completed; sends are possible.
    Open,
    /// Connection lost, torn down, or reconnection exhausted.
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

/// The signed-in account, as returned by the profile lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// One conversation in the signed-in user's room list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    #[serde(rename = "chat_room_id")]
    pub room_id: RoomId,
    pub other_person_name: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_time: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
