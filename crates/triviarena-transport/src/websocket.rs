//! Websocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, Transport, TransportError};

/// Upper bound on how much of the request head is inspected.
const MAX_REQUEST_HEAD: usize = 4096;

/// How long a freshly accepted socket may take to send its request head.
const REQUEST_HEAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between peeks while the request head is still arriving.
const PEEK_RETRY: Duration = Duration::from_millis(5);

const NOT_IMPLEMENTED: &[u8] =
    b"HTTP/1.1 501 Not Implemented\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

type WsStream = WebSocketStream<TcpStream>;

/// A websocket [`Transport`] that listens for incoming TCP connections.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a new transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "websocket transport listening");
        Ok(Self { listener })
    }
}

impl Transport for WebSocketTransport {
    type Incoming = PendingConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::debug!(%addr, "accepted TCP connection");
        Ok(PendingConnection { stream, addr })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// An accepted socket whose websocket handshake hasn't happened yet.
pub struct PendingConnection {
    stream: TcpStream,
    addr: SocketAddr,
}

impl PendingConnection {
    /// The remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Inspects the request head without consuming it.
    ///
    /// Anything that isn't a websocket upgrade is answered with
    /// `501 Not Implemented` and reported as [`TransportError::NotWebSocket`].
    pub async fn check_upgrade(&mut self) -> Result<(), TransportError> {
        let head = tokio::time::timeout(REQUEST_HEAD_TIMEOUT, peek_request_head(&self.stream))
            .await
            .map_err(|_| {
                TransportError::ConnectionClosed("timed out waiting for request".into())
            })??;

        if is_websocket_upgrade(&head) {
            return Ok(());
        }

        tracing::debug!(addr = %self.addr, "rejecting non-websocket request");
        // Best effort: the peer may already be gone.
        let _ = self.stream.write_all(NOT_IMPLEMENTED).await;
        let _ = self.stream.shutdown().await;
        Err(TransportError::NotWebSocket)
    }

    /// Completes the websocket opening handshake.
    pub async fn handshake(self) -> Result<WebSocketConnection, TransportError> {
        let ws = tokio_tungstenite::accept_async(self.stream)
            .await
            .map_err(|e| TransportError::HandshakeFailed(std::io::Error::other(e)))?;
        let (sink, stream) = ws.split();
        tracing::debug!(addr = %self.addr, "websocket handshake complete");
        Ok(WebSocketConnection {
            addr: self.addr,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

/// Peeks until the blank line ending the request head is visible, the
/// buffer is full, or the peer closes.
async fn peek_request_head(stream: &TcpStream) -> Result<Vec<u8>, TransportError> {
    let mut buf = vec![0u8; MAX_REQUEST_HEAD];
    loop {
        let n = stream
            .peek(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        if n == 0 {
            return Err(TransportError::ConnectionClosed(
                "closed before sending a request".into(),
            ));
        }
        if n == buf.len() || buf[..n].windows(4).any(|w| w == b"\r\n\r\n") {
            buf.truncate(n);
            return Ok(buf);
        }
        tokio::time::sleep(PEEK_RETRY).await;
    }
}

/// Returns `true` if an HTTP request head carries `Upgrade: websocket`.
///
/// Header names and values are matched case-insensitively, and the
/// `Upgrade` value may list several protocols.
pub fn is_websocket_upgrade(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head);
    text.split("\r\n")
        .skip(1)
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .any(|(name, value)| {
            name.trim().eq_ignore_ascii_case("upgrade")
                && value
                    .split(',')
                    .any(|proto| proto.trim().eq_ignore_ascii_case("websocket"))
        })
}

/// A single open websocket connection.
///
/// The sink and stream halves are locked separately, so a task blocked in
/// [`recv`](Connection::recv) never holds up a concurrent
/// [`send`](Connection::send).
pub struct WebSocketConnection {
    addr: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// UTF-8 payloads go out as text frames, anything else as binary.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::Text(text.to_owned().into()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_bytes().to_vec())),
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }

    fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}
