//! Realtime transport trait definitions.
//!
//! A transport opens one duplex connection per room. The connection is
//! handed back split into a [`FrameSink`] and a [`FrameStream`] so the
//! session driver can wait for inbound frames while writing outbound ones.
//!
//! Implementations live in gigloom-infra (e.g., `WsTransport`).

use gigloom_types::auth::Credential;
use gigloom_types::chat::RoomId;
use gigloom_types::error::TransportError;

/// Connects to a room's realtime channel.
pub trait RealtimeTransport: Send + Sync + 'static {
    type Sink: FrameSink;
    type Stream: FrameStream;

    /// Perform the handshake. Resolves once the connection is open.
    fn connect(
        &self,
        room: &RoomId,
        credential: &Credential,
    ) -> impl std::future::Future<Output = Result<(Self::Sink, Self::Stream), TransportError>> + Send;
}

/// Write half of an open connection.
pub trait FrameSink: Send + 'static {
    /// Write one text frame.
    fn send_frame(
        &mut self,
        frame: String,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Close the connection. Errors are ignored.
    fn close(&mut self) -> impl std::future::Future<Output = ()> + Send;
}

/// Read half of an open connection.
pub trait FrameStream: Send + 'static {
    /// Next inbound text frame; `None` once the peer closed the connection.
    ///
    /// Must be cancel safe: the driver polls it inside `tokio::select!`.
    fn next_frame(
        &mut self,
    ) -> impl std::future::Future<Output = Option<Result<String, TransportError>>> + Send;
}
