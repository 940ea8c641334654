//! Public handle for one room's real-time chat.
//!
//! `ChatSession::open` spawns the session driver and hands back a handle
//! plus the first event subscription. The handle exposes read-only views of
//! the connection state and timeline, an atomic check-and-send, and
//! deterministic teardown. Dropping the handle cancels the session.

use std::sync::Arc;
use std::time::Duration;

use gigloom_types::chat::{ChatMessage, ConnectionState, ParticipantId, RoomId};
use gigloom_types::config::ClientConfig;
use gigloom_types::error::{SendError, SessionError};
use gigloom_types::event::SessionEvent;
use gigloom_types::frame::OutboundFrame;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::driver::{DriverParts, SessionDriver};
use super::reconnect::{ReconnectPolicy, ReconnectTracker};
use super::timeline::{Timeline, DEFAULT_DUPLICATE_WINDOW};
use crate::auth::SessionAuth;
use crate::event::EventBus;
use crate::repository::HistoryStore;
use crate::transport::RealtimeTransport;

/// Tunables for a chat session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub reconnect: ReconnectPolicy,
    pub duplicate_window: Duration,
    pub event_buffer: usize,
    /// Frames that may wait for the driver to write them.
    pub outbound_buffer: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            duplicate_window: DEFAULT_DUPLICATE_WINDOW,
            event_buffer: 256,
            outbound_buffer: 32,
        }
    }
}

impl From<&ClientConfig> for SessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            reconnect: ReconnectPolicy::from(&config.reconnect),
            duplicate_window: config.duplicate_window(),
            event_buffer: config.event_buffer,
            ..Self::default()
        }
    }
}

/// A live chat connection to one room.
pub struct ChatSession {
    room: RoomId,
    participant: Option<ParticipantId>,
    state: watch::Receiver<ConnectionState>,
    timeline: watch::Receiver<Arc<Vec<ChatMessage>>>,
    outbound: mpsc::Sender<String>,
    events: EventBus,
    cancel: CancellationToken,
    driver: Option<JoinHandle<()>>,
}

impl ChatSession {
    /// Open a session: fetch the room's history and connect its socket
    /// concurrently.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`SessionError::MissingCredential`] when `auth` has no credential;
    /// the caller should send the user to sign in.
    pub fn open<A, H, T>(
        room: RoomId,
        auth: &A,
        history: Arc<H>,
        transport: Arc<T>,
        options: SessionOptions,
    ) -> Result<(Self, broadcast::Receiver<SessionEvent>), SessionError>
    where
        A: SessionAuth + ?Sized,
        H: HistoryStore + 'static,
        T: RealtimeTransport,
    {
        let credential = auth.credential().ok_or(SessionError::MissingCredential)?;

        let events = EventBus::new(options.event_buffer);
        let first_subscriber = events.subscribe();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (timeline_tx, timeline_rx) = watch::channel(Arc::new(Vec::new()));
        let (outbound_tx, outbound_rx) = mpsc::channel(options.outbound_buffer.max(1));
        let cancel = CancellationToken::new();

        let driver = SessionDriver::new(DriverParts {
            room: room.clone(),
            credential,
            history,
            transport,
            timeline: Timeline::new(options.duplicate_window),
            tracker: ReconnectTracker::new(options.reconnect),
            state_tx,
            timeline_tx,
            outbound_rx,
            events: events.clone(),
            cancel: cancel.clone(),
        });
        let handle = tokio::spawn(driver.run());
        info!(room = %room, "chat session opened");

        let session = Self {
            room,
            participant: None,
            state: state_rx,
            timeline: timeline_rx,
            outbound: outbound_tx,
            events,
            cancel,
            driver: Some(handle),
        };
        Ok((session, first_subscriber))
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Current transport state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// A receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Snapshot of the ordered, de-duplicated timeline.
    pub fn timeline(&self) -> Arc<Vec<ChatMessage>> {
        Arc::clone(&self.timeline.borrow())
    }

    /// Subscribe to session events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Set the local participant identity (from the profile lookup).
    pub fn set_participant(&mut self, participant: ParticipantId) {
        self.participant = Some(participant);
    }

    pub fn participant(&self) -> Option<&ParticipantId> {
        self.participant.as_ref()
    }

    /// Whether `message` was written by the local participant.
    pub fn is_own(&self, message: &ChatMessage) -> bool {
        self.participant.as_ref() == Some(&message.sender_id)
    }

    /// Queue one message for the open connection.
    ///
    /// The text is trimmed before sending. Nothing is appended to the
    /// timeline: the message appears once the server relays it back. On
    /// error nothing was queued, so the caller should keep its input.
    pub fn send(&self, text: &str) -> Result<(), SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if self.participant.is_none() {
            return Err(SendError::UnknownParticipant);
        }
        if !self.state().is_open() || self.cancel.is_cancelled() {
            return Err(SendError::NotOpen);
        }

        let frame = OutboundFrame::new(text)
            .encode()
            .map_err(|e| SendError::Encode(e.to_string()))?;
        self.outbound.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => SendError::NotOpen,
        })?;

        debug!(room = %self.room, "queued chat message");
        Ok(())
    }

    /// [`send`](Self::send), reporting only whether the message was queued.
    pub fn try_send(&self, text: &str) -> bool {
        match self.send(text) {
            Ok(()) => true,
            Err(err) => {
                debug!(room = %self.room, error = %err, "send rejected");
                false
            }
        }
    }

    /// Whether teardown has been requested.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Tear the session down and wait for the driver to finish.
    ///
    /// Cancels any pending reconnect delay, closes the open connection, and
    /// discards a history response that has not arrived yet. Idempotent.
    pub async fn close(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.driver.take() {
            if let Err(err) = handle.await {
                warn!(room = %self.room, error = %err, "chat session driver failed");
            }
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("room", &self.room)
            .field("state", &self.state())
            .field("participant", &self.participant)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
