//! WebSocket chat transport.
//!
//! [`WsTransport`] implements [`RealtimeTransport`] with tokio-tungstenite.
//! The socket address is derived from the REST base URL: `http` becomes
//! `ws`, `https` becomes `wss`, and the room path and token are appended:
//!
//! ```text
//! https://api.example.com/v1  ->  wss://api.example.com/v1/ws/chat/<room>/?token=<credential>
//! ```

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use gigloom_core::transport::{FrameSink, FrameStream, RealtimeTransport};
use gigloom_types::auth::Credential;
use gigloom_types::chat::RoomId;
use gigloom_types::error::TransportError;
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens one WebSocket per chat room.
#[derive(Debug, Clone)]
pub struct WsTransport {
    base_url: String,
}

impl WsTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Build the socket URL for `room`, carrying `credential` as a query
    /// parameter.
    pub fn socket_url(&self, room: &RoomId, credential: &Credential) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", self.base_url)))?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(TransportError::InvalidUrl(format!(
                    "unsupported scheme: {other}"
                )));
            }
        };
        url.set_scheme(scheme)
            .map_err(|()| TransportError::InvalidUrl(format!("cannot use scheme {scheme}")))?;

        let path = format!("{}/ws/chat/{}/", url.path().trim_end_matches('/'), room);
        url.set_path(&path);
        url.set_query(None);
        url.query_pairs_mut().append_pair("token", credential.expose());
        Ok(url)
    }
}

impl RealtimeTransport for WsTransport {
    type Sink = WsSink;
    type Stream = WsStream;

    async fn connect(
        &self,
        room: &RoomId,
        credential: &Credential,
    ) -> Result<(WsSink, WsStream), TransportError> {
        let url = self.socket_url(room, credential)?;
        debug!(room = %room, host = url.host_str().unwrap_or_default(), "connecting chat socket");

        let (socket, _response) = connect_async(url.as_str()).await.map_err(map_handshake_error)?;
        let (sink, stream) = socket.split();
        Ok((WsSink { inner: sink }, WsStream { inner: stream }))
    }
}

fn map_handshake_error(err: WsError) -> TransportError {
    match err {
        WsError::Http(response) if response.status() == StatusCode::UNAUTHORIZED => {
            TransportError::Unauthorized
        }
        WsError::Http(response) => {
            TransportError::Connect(format!("handshake rejected with HTTP {}", response.status()))
        }
        WsError::Io(e) => TransportError::Connect(e.to_string()),
        WsError::Url(e) => TransportError::InvalidUrl(e.to_string()),
        other => TransportError::Protocol(other.to_string()),
    }
}

/// Write half of a chat socket.
pub struct WsSink {
    inner: SplitSink<Socket, Message>,
}

impl FrameSink for WsSink {
    async fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        self.inner
            .send(Message::text(frame))
            .await
            .map_err(|e| match e {
                WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
                other => TransportError::Protocol(other.to_string()),
            })
    }

    async fn close(&mut self) {
        if let Err(err) = self.inner.close().await {
            debug!(error = %err, "chat socket close failed");
        }
    }
}

/// Read half of a chat socket. Only text frames are surfaced.
pub struct WsStream {
    inner: SplitStream<Socket>,
}

impl FrameStream for WsStream {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "chat socket closed by peer");
                    return None;
                }
                Ok(other) => trace!(len = other.len(), "ignoring non-text frame"),
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return None,
                Err(err) => return Some(Err(TransportError::Protocol(err.to_string()))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

    fn transport(base: &str) -> WsTransport {
        WsTransport::new(base)
    }

    #[test]
    fn socket_url_maps_scheme_path_and_token() {
        let room = RoomId::from("42");
        let cred = Credential::new("a b&c");

        let url = transport("http://localhost:8000").socket_url(&room, &cred).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/ws/chat/42/?token=a+b%26c");

        let url = transport("https://api.gigloom.test/v1/").socket_url(&room, &cred).unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/v1/ws/chat/42/");
    }

    #[test]
    fn socket_url_rejects_bad_base() {
        let room = RoomId::from("1");
        let cred = Credential::new("t");
        assert!(matches!(
            transport("not a url").socket_url(&room, &cred),
            Err(TransportError::InvalidUrl(_))
        ));
        assert!(matches!(
            transport("ftp://host").socket_url(&room, &cred),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn exchanges_text_frames_with_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (uri_tx, uri_rx) = oneshot::channel();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let _ = uri_tx.send(req.uri().to_string());
                Ok(resp)
            };
            let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();
            ws.send(Message::Ping(Vec::new().into())).await.unwrap();
            ws.send(Message::text(r#"{"message":"hi","sender_id":3}"#))
                .await
                .unwrap();
            let echoed = loop {
                match ws.next().await.unwrap().unwrap() {
                    Message::Text(text) => break text.to_string(),
                    _ => continue,
                }
            };
            ws.close(None).await.unwrap();
            echoed
        });

        let transport = transport(&format!("http://{addr}"));
        let (mut sink, mut stream) = transport
            .connect(&RoomId::from("42"), &Credential::new("tok"))
            .await
            .unwrap();

        assert_eq!(uri_rx.await.unwrap(), "/ws/chat/42/?token=tok");
        let frame = stream.next_frame().await.unwrap().unwrap();
        assert_eq!(frame, r#"{"message":"hi","sender_id":3}"#);

        sink.send_frame(r#"{"message":"hello"}"#.to_string()).await.unwrap();
        assert_eq!(server.await.unwrap(), r#"{"message":"hello"}"#);
        assert!(stream.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn unauthorized_handshake_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = |_: &Request, _: Response| -> Result<Response, ErrorResponse> {
                let mut refusal = ErrorResponse::new(None);
                *refusal.status_mut() = StatusCode::UNAUTHORIZED;
                Err(refusal)
            };
            let _ = tokio_tungstenite::accept_hdr_async(stream, callback).await;
        });

        let err = transport(&format!("http://{addr}"))
            .connect(&RoomId::from("42"), &Credential::new("expired"))
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport(&format!("http://{addr}"))
            .connect(&RoomId::from("1"), &Credential::new("t"))
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)));
    }
}
