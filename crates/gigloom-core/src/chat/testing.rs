//! Scripted collaborators for chat session tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gigloom_types::auth::Credential;
use gigloom_types::chat::{ChatMessage, RoomId};
use gigloom_types::error::{ApiError, TransportError};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::repository::HistoryStore;
use crate::transport::{FrameSink, FrameStream, RealtimeTransport};

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

pub(crate) struct FakeHistory {
    outcome: Result<Vec<ChatMessage>, ApiError>,
    delay: Duration,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl FakeHistory {
    pub(crate) fn ok(messages: Vec<ChatMessage>) -> Self {
        Self::with_outcome(Ok(messages))
    }

    pub(crate) fn failing(error: ApiError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<Vec<ChatMessage>, ApiError>) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl HistoryStore for FakeHistory {
    async fn fetch_messages(
        &self,
        _room: &RoomId,
        _credential: &Credential,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Outcome of one scripted handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handshake {
    Accept,
    Refuse,
    Unauthorized,
    /// The handshake never completes.
    Hang,
}

type Inbound = Result<String, TransportError>;

/// A transport whose handshakes follow a script; once the script runs out
/// every further handshake uses `fallback`.
pub(crate) struct FakeTransport {
    script: Mutex<VecDeque<Handshake>>,
    fallback: Handshake,
    connect_times: Mutex<Vec<Instant>>,
    peers: Mutex<Vec<Option<mpsc::UnboundedSender<Inbound>>>>,
    written: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    stall_on: Option<String>,
}

impl FakeTransport {
    pub(crate) fn scripted(script: Vec<Handshake>, fallback: Handshake) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            connect_times: Mutex::new(Vec::new()),
            peers: Mutex::new(Vec::new()),
            written: Arc::new(Mutex::new(Vec::new())),
            closes: Arc::new(AtomicUsize::new(0)),
            stall_on: None,
        }
    }

    /// Writes of exactly `frame` never complete.
    pub(crate) fn stalling_on(mut self, frame: &str) -> Self {
        self.stall_on = Some(frame.to_string());
        self
    }

    pub(crate) fn accepting() -> Self {
        Self::scripted(Vec::new(), Handshake::Accept)
    }

    pub(crate) fn refusing() -> Self {
        Self::scripted(Vec::new(), Handshake::Refuse)
    }

    pub(crate) fn connects(&self) -> usize {
        self.connect_times.lock().unwrap().len()
    }

    pub(crate) fn connect_times(&self) -> Vec<Instant> {
        self.connect_times.lock().unwrap().clone()
    }

    pub(crate) fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Deliver a text frame on the `index`-th accepted connection.
    pub(crate) fn push_frame(&self, index: usize, frame: &str) {
        let peers = self.peers.lock().unwrap();
        if let Some(Some(tx)) = peers.get(index) {
            let _ = tx.send(Ok(frame.to_string()));
        }
    }

    /// Close the `index`-th accepted connection from the server side.
    pub(crate) fn drop_connection(&self, index: usize) {
        let mut peers = self.peers.lock().unwrap();
        if let Some(slot) = peers.get_mut(index) {
            slot.take();
        }
    }

    fn next_handshake(&self) -> Handshake {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

impl RealtimeTransport for FakeTransport {
    type Sink = FakeSink;
    type Stream = FakeStream;

    async fn connect(
        &self,
        _room: &RoomId,
        _credential: &Credential,
    ) -> Result<(FakeSink, FakeStream), TransportError> {
        self.connect_times.lock().unwrap().push(Instant::now());
        match self.next_handshake() {
            Handshake::Refuse => Err(TransportError::Connect("connection refused".to_string())),
            Handshake::Unauthorized => Err(TransportError::Unauthorized),
            Handshake::Hang => std::future::pending().await,
            Handshake::Accept => {
                let (tx, rx) = mpsc::unbounded_channel();
                self.peers.lock().unwrap().push(Some(tx));
                let sink = FakeSink {
                    written: Arc::clone(&self.written),
                    closes: Arc::clone(&self.closes),
                    stall_on: self.stall_on.clone(),
                };
                Ok((sink, FakeStream { rx }))
            }
        }
    }
}

pub(crate) struct FakeSink {
    written: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    stall_on: Option<String>,
}

impl FrameSink for FakeSink {
    async fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        if self.stall_on.as_deref() == Some(frame.as_str()) {
            return std::future::pending().await;
        }
        self.written.lock().unwrap().push(frame);
        Ok(())
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct FakeStream {
    rx: mpsc::UnboundedReceiver<Inbound>,
}

impl FrameStream for FakeStream {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        self.rx.recv().await
    }
}
