//! The task that owns a chat session's mutable state.
//!
//! One driver runs per `ChatSession`. It polls the history fetch, the
//! transport link, the outbound queue, and the cancellation token from a
//! single `select!` loop, so every timeline and state mutation happens on
//! one logical thread of execution.

use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gigloom_types::auth::Credential;
use gigloom_types::chat::{ChatMessage, ConnectionState, RoomId};
use gigloom_types::error::{ApiError, TransportError};
use gigloom_types::event::SessionEvent;
use gigloom_types::frame::InboundFrame;
use tokio::sync::{mpsc, watch};
use tokio::time::Sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::reconnect::{ReconnectDecision, ReconnectTracker};
use super::timeline::Timeline;
use crate::event::EventBus;
use crate::repository::HistoryStore;
use crate::transport::{FrameSink, FrameStream, RealtimeTransport};

/// Upper bound on waiting for the peer to acknowledge a close.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// A single frame write taking longer than this counts as a lost link.
pub(crate) const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

type Connection<T> = (
    <T as RealtimeTransport>::Sink,
    <T as RealtimeTransport>::Stream,
);
type ConnectFuture<T> = Pin<Box<dyn Future<Output = Result<Connection<T>, TransportError>> + Send>>;
type HistoryFuture = Pin<Box<dyn Future<Output = Result<Vec<ChatMessage>, ApiError>> + Send>>;

/// Where the transport currently is.
enum Link<T: RealtimeTransport> {
    Connecting(ConnectFuture<T>),
    Open { sink: T::Sink, stream: T::Stream },
    Backoff(Pin<Box<Sleep>>),
    /// Closed for good (auth failure or retries exhausted). Never resolves.
    Idle,
}

enum LinkStep<T: RealtimeTransport> {
    Connected(Result<Connection<T>, TransportError>),
    Frame(Option<Result<String, TransportError>>),
    BackoffElapsed,
}

impl<T: RealtimeTransport> Link<T> {
    /// Wait for the link's next event. Cancel safe: all progress lives in
    /// `self`, so dropping the returned future loses nothing.
    async fn step(&mut self) -> LinkStep<T> {
        match self {
            Link::Connecting(connect) => LinkStep::Connected(connect.as_mut().await),
            Link::Open { stream, .. } => LinkStep::Frame(stream.next_frame().await),
            Link::Backoff(sleep) => {
                sleep.as_mut().await;
                LinkStep::BackoffElapsed
            }
            Link::Idle => std::future::pending::<LinkStep<T>>().await,
        }
    }
}

pub(crate) struct SessionDriver<H, T: RealtimeTransport> {
    room: RoomId,
    credential: Credential,
    history: Arc<H>,
    transport: Arc<T>,
    timeline: Timeline,
    tracker: ReconnectTracker,
    link: Link<T>,
    state_tx: watch::Sender<ConnectionState>,
    timeline_tx: watch::Sender<Arc<Vec<ChatMessage>>>,
    outbound_rx: mpsc::Receiver<String>,
    events: EventBus,
    cancel: CancellationToken,
}

pub(crate) struct DriverParts<H, T> {
    pub room: RoomId,
    pub credential: Credential,
    pub history: Arc<H>,
    pub transport: Arc<T>,
    pub timeline: Timeline,
    pub tracker: ReconnectTracker,
    pub state_tx: watch::Sender<ConnectionState>,
    pub timeline_tx: watch::Sender<Arc<Vec<ChatMessage>>>,
    pub outbound_rx: mpsc::Receiver<String>,
    pub events: EventBus,
    pub cancel: CancellationToken,
}

impl<H, T> SessionDriver<H, T>
where
    H: HistoryStore + 'static,
    T: RealtimeTransport,
{
    pub(crate) fn new(parts: DriverParts<H, T>) -> Self {
        Self {
            room: parts.room,
            credential: parts.credential,
            history: parts.history,
            transport: parts.transport,
            timeline: parts.timeline,
            tracker: parts.tracker,
            link: Link::Idle,
            state_tx: parts.state_tx,
            timeline_tx: parts.timeline_tx,
            outbound_rx: parts.outbound_rx,
            events: parts.events,
            cancel: parts.cancel,
        }
    }

    pub(crate) async fn run(mut self) {
        // History and handshake are issued together; neither waits on the other.
        let mut history = Some(self.fetch_history());
        self.start_connect();

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                result = poll_history(&mut history), if history.is_some() => {
                    history = None;
                    self.apply_history(result);
                }

                step = self.link.step() => match step {
                    LinkStep::Connected(Ok((sink, stream))) => self.on_connected(sink, stream),
                    LinkStep::Connected(Err(err)) => self.on_link_lost(Some(err)).await,
                    LinkStep::Frame(Some(Ok(raw))) => self.on_frame(&raw),
                    LinkStep::Frame(Some(Err(err))) => self.on_link_lost(Some(err)).await,
                    LinkStep::Frame(None) => self.on_link_lost(None).await,
                    LinkStep::BackoffElapsed => self.start_connect(),
                },

                Some(frame) = self.outbound_rx.recv() => self.write_frame(frame).await,
            }
        }

        self.teardown().await;
    }

    fn fetch_history(&self) -> HistoryFuture {
        let history = Arc::clone(&self.history);
        let room = self.room.clone();
        let credential = self.credential.clone();
        Box::pin(async move { history.fetch_messages(&room, &credential).await })
    }

    fn start_connect(&mut self) {
        let transport = Arc::clone(&self.transport);
        let room = self.room.clone();
        let credential = self.credential.clone();
        debug!(room = %self.room, attempt = self.tracker.attempts(), "opening chat socket");
        self.link = Link::Connecting(Box::pin(async move {
            transport.connect(&room, &credential).await
        }));
        self.set_state(ConnectionState::Connecting);
    }

    fn on_connected(&mut self, sink: T::Sink, stream: T::Stream) {
        info!(room = %self.room, "chat socket open");
        self.tracker.on_open();
        self.link = Link::Open { sink, stream };
        self.set_state(ConnectionState::Open);
    }

    async fn on_link_lost(&mut self, error: Option<TransportError>) {
        if let Link::Open { mut sink, .. } = mem::replace(&mut self.link, Link::Idle) {
            close_sink(&self.cancel, &self.room, &mut sink).await;
        }
        self.discard_outbound();
        self.set_state(ConnectionState::Closed);

        match &error {
            Some(err) if err.is_auth_failure() => {
                warn!(room = %self.room, "chat socket rejected the credential");
                self.events.publish(SessionEvent::AuthRequired);
                return;
            }
            Some(err) => debug!(room = %self.room, error = %err, "chat socket lost"),
            None => debug!(room = %self.room, "chat socket closed by server"),
        }

        match self.tracker.on_close() {
            ReconnectDecision::Retry { attempt, delay } => {
                info!(
                    room = %self.room,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "reconnecting chat socket"
                );
                self.link = Link::Backoff(Box::pin(tokio::time::sleep(delay)));
                self.events.publish(SessionEvent::ReconnectScheduled {
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                });
            }
            ReconnectDecision::GiveUp { attempts } => {
                warn!(room = %self.room, attempts, "unable to reconnect chat socket, giving up");
                self.events
                    .publish(SessionEvent::ReconnectExhausted { attempts });
            }
        }
    }

    fn on_frame(&mut self, raw: &str) {
        let frame = match InboundFrame::parse(raw) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(room = %self.room, error = %err, "dropping malformed chat frame");
                self.events.publish(SessionEvent::FrameDropped {
                    reason: err.to_string(),
                });
                return;
            }
        };

        let sender = frame.sender();
        let message = ChatMessage::live(frame.message, sender, Utc::now());
        if self.timeline.push_live(message.clone()) {
            self.publish_timeline();
            self.events
                .publish(SessionEvent::MessageReceived { message });
        } else {
            debug!(room = %self.room, "suppressed duplicate chat message");
        }
    }

    fn apply_history(&mut self, result: Result<Vec<ChatMessage>, ApiError>) {
        match result {
            Ok(messages) => {
                let count = self.timeline.merge_history(messages);
                info!(room = %self.room, count, "loaded message history");
                self.publish_timeline();
                self.events.publish(SessionEvent::HistoryLoaded { count });
            }
            Err(err) if err.is_auth_failure() => {
                warn!(room = %self.room, "history fetch rejected the credential");
                self.events.publish(SessionEvent::AuthRequired);
            }
            Err(err) => {
                warn!(room = %self.room, error = %err, "failed to load message history");
                self.events.publish(SessionEvent::HistoryFailed {
                    reason: err.to_string(),
                });
            }
        }
    }

    async fn write_frame(&mut self, frame: String) {
        let Link::Open { sink, .. } = &mut self.link else {
            debug!(room = %self.room, "discarding frame queued while the socket was down");
            return;
        };

        // A stalled write must not hold off teardown.
        let written = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return,
            written = tokio::time::timeout(WRITE_TIMEOUT, sink.send_frame(frame)) => written,
        };
        match written {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.on_link_lost(Some(err)).await,
            Err(_) => {
                warn!(room = %self.room, "chat socket write timed out");
                let err = TransportError::Protocol("write timed out".to_string());
                self.on_link_lost(Some(err)).await;
            }
        }
    }

    /// Frames queued for a connection that is gone must not reach a later one.
    fn discard_outbound(&mut self) {
        let mut dropped = 0usize;
        while self.outbound_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!(room = %self.room, dropped, "discarded unsent frames");
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            self.events.publish(SessionEvent::StateChanged { state });
        }
    }

    fn publish_timeline(&self) {
        self.timeline_tx
            .send_replace(Arc::new(self.timeline.entries().to_vec()));
    }

    async fn teardown(&mut self) {
        if let Link::Open { mut sink, .. } = mem::replace(&mut self.link, Link::Idle) {
            if tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await.is_err() {
                debug!(room = %self.room, "chat socket close timed out");
            }
        }
        self.outbound_rx.close();
        self.set_state(ConnectionState::Closed);
        debug!(room = %self.room, "chat session torn down");
    }
}

/// Close a sink that is being dropped, giving up early on teardown.
async fn close_sink<S: FrameSink>(cancel: &CancellationToken, room: &RoomId, sink: &mut S) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {}
        closed = tokio::time::timeout(CLOSE_TIMEOUT, sink.close()) => {
            if closed.is_err() {
                debug!(room = %room, "chat socket close timed out");
            }
        }
    }
}

async fn poll_history(
    history: &mut Option<HistoryFuture>,
) -> Result<Vec<ChatMessage>, ApiError> {
    match history {
        Some(fetch) => fetch.as_mut().await,
        None => std::future::pending().await,
    }
}
