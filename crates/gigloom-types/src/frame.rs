//! JSON frames exchanged over the chat socket.
//!
//! One JSON object per text frame, no envelope: the server relays
//! `{message, sender_id}` to every participant (including the author) and
//! the client writes `{message}`.

use serde::{Deserialize, Serialize};

use crate::chat::{deserialize_flexible_id, ParticipantId};

/// Server -> client chat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundFrame {
    pub message: String,
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub sender_id: String,
}

impl InboundFrame {
    /// Parse a raw text frame.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn sender(&self) -> ParticipantId {
        ParticipantId::new(self.sender_id.clone())
    }
}

/// Client -> server chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundFrame {
    pub message: String,
}

impl OutboundFrame {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Serialize into the text payload written to the socket.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
