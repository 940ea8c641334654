//! Notifications a `ChatSession` delivers to its consumer.
//!
//! `SessionEvent` is broadcast on the session's event bus. All variants are
//! Clone + Send + Sync for use with tokio broadcast channels.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ConnectionState};

/// Events emitted by a chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The transport moved to a new state.
    StateChanged { state: ConnectionState },

    /// A live message passed de-duplication and joined the timeline.
    MessageReceived { message: ChatMessage },

    /// The history page was merged into the timeline.
    HistoryLoaded {
        /// Entries contributed by the page (after de-duplication).
        count: usize,
    },

    /// The history fetch failed for a non-authorization reason. Not retried.
    HistoryFailed { reason: String },

    /// A collaborator rejected the credential; the caller should re-authenticate.
    AuthRequired,

    /// The transport dropped and a new handshake is scheduled.
    ReconnectScheduled { attempt: u32, delay_ms: u64 },

    /// All reconnection attempts failed. Terminal.
    ReconnectExhausted { attempts: u32 },

    /// An inbound frame could not be parsed and was skipped.
    FrameDropped { reason: String },
}

impl SessionEvent {
    /// Whether this event ends the session's ability to deliver messages.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::AuthRequired | SessionEvent::ReconnectExhausted { .. }
        )
    }
}
