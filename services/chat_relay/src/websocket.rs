//! WebSocket-backed [`Connection`]
//!
//! Each WebSocket message is one frame. Binary and text messages both carry
//! codec bytes; ping/pong is answered by tungstenite itself. Reads and writes
//! race a cancellation token so `close()` unblocks whichever pump is waiting.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use messaging_actors::{Connection, ConnectionError};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

type WsStream = WebSocketStream<TcpStream>;

pub struct WebSocketConnection {
    reader: Mutex<SplitStream<WsStream>>,
    writer: Mutex<SplitSink<WsStream, WsMessage>>,
    shutdown: CancellationToken,
    peer_addr: SocketAddr,
}

impl WebSocketConnection {
    pub fn new(stream: WsStream, peer_addr: SocketAddr) -> Self {
        let (writer, reader) = stream.split();
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            shutdown: CancellationToken::new(),
            peer_addr,
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Send a close frame once the actor using this connection has stopped
    pub async fn finish(&self) {
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.close().await {
            debug!(peer = %self.peer_addr, error = %e, "Error sending close frame");
        }
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn read_frame(&self) -> Result<Option<Bytes>, ConnectionError> {
        let mut reader = self.reader.lock().await;
        loop {
            let next = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(None),
                next = reader.next() => next,
            };

            match next {
                None => return Ok(None),
                Some(Ok(WsMessage::Binary(data))) => return Ok(Some(Bytes::from(data))),
                Some(Ok(WsMessage::Text(text))) => {
                    return Ok(Some(Bytes::from(text.into_bytes())))
                }
                Some(Ok(WsMessage::Close(frame))) => return close_outcome(frame),
                Some(Ok(other)) => {
                    trace!(peer = %self.peer_addr, kind = ?other, "Ignoring control message");
                }
                Some(Err(e)) => return Err(map_ws_error(e)),
            }
        }
    }

    async fn write_frame(&self, frame: Bytes) -> Result<(), ConnectionError> {
        if self.shutdown.is_cancelled() {
            return Err(ConnectionError::Closed);
        }

        let mut writer = self.writer.lock().await;
        tokio::select! {
            _ = self.shutdown.cancelled() => Err(ConnectionError::Closed),
            result = writer.send(WsMessage::Binary(frame.to_vec())) => result.map_err(map_ws_error),
        }
    }

    fn close(&self) {
        self.shutdown.cancel();
    }
}

/// Normal, going-away and abnormal closures are ordinary disconnects
fn close_outcome(frame: Option<CloseFrame<'static>>) -> Result<Option<Bytes>, ConnectionError> {
    match frame {
        None => Ok(None),
        Some(frame) => match frame.code {
            CloseCode::Normal | CloseCode::Away | CloseCode::Abnormal => Ok(None),
            code => Err(ConnectionError::UnexpectedClose {
                code: u16::from(code),
                reason: frame.reason.to_string(),
            }),
        },
    }
}

fn map_ws_error(error: tungstenite::Error) -> ConnectionError {
    match error {
        tungstenite::Error::ConnectionClosed
        | tungstenite::Error::AlreadyClosed
        | tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            ConnectionError::Closed
        }
        tungstenite::Error::Io(e) => ConnectionError::Io(e),
        other => ConnectionError::transport(other.to_string()),
    }
}
