//! WebSocket transport: one duplex message channel to a single target.
//!
//! The transport is split into a sender half (owned by the connection's
//! writer task) and a receiver half (a read loop forwarding parsed JSON
//! messages into an in-process queue). Each WebSocket text frame carries
//! exactly one JSON message.

use crate::error::{Error, Result};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Sender half of a transport.
pub trait Transport: Send {
    /// Sends one JSON message as a single frame.
    fn send(&mut self, message: Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Initiates an orderly shutdown of the channel.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Receiver half of a transport.
pub trait TransportReceiver: Send {
    /// Runs the read loop until the peer closes the channel or a read
    /// fails. Parsed messages are forwarded to the queue handed out by
    /// the transport constructor.
    fn run(self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;
}

/// The pieces a [`crate::Connection`] is built from.
pub struct TransportParts {
    pub sender: Box<dyn Transport>,
    pub receiver: Box<dyn TransportReceiver>,
    pub message_rx: mpsc::UnboundedReceiver<Value>,
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// WebSocket transport to a target's channel address.
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Opens the channel at `address` (a `ws://` URL from a target
    /// descriptor) and returns the split transport.
    pub async fn connect(address: &str) -> Result<TransportParts> {
        let (socket, _response) = connect_async(address)
            .await
            .map_err(|err| Error::ConnectionFailed(format!("{address}: {err}")))?;
        tracing::debug!(%address, "channel opened");

        let (sink, stream) = socket.split();
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        Ok(TransportParts {
            sender: Box::new(WebSocketTransportSender { sink }),
            receiver: Box::new(WebSocketTransportReceiver { stream, message_tx }),
            message_rx,
        })
    }
}

pub struct WebSocketTransportSender {
    sink: WsSink,
}

impl Transport for WebSocketTransportSender {
    fn send(&mut self, message: Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let text = serde_json::to_string(&message)?;
            self.sink
                .send(WsMessage::Text(text))
                .await
                .map_err(|err| Error::Transport(err.to_string()))
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.sink
                .send(WsMessage::Close(None))
                .await
                .map_err(|err| Error::Transport(err.to_string()))
        })
    }
}

pub struct WebSocketTransportReceiver {
    stream: WsStream,
    message_tx: mpsc::UnboundedSender<Value>,
}

impl TransportReceiver for WebSocketTransportReceiver {
    fn run(self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        Box::pin(async move {
            let mut stream = self.stream;
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(WsMessage::Text(text)) => match serde_json::from_str::<Value>(&text) {
                        Ok(message) => {
                            if self.message_tx.send(message).is_err() {
                                // Connection side is gone; stop reading.
                                break;
                            }
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "discarding unparseable frame");
                        }
                    },
                    Ok(WsMessage::Close(_)) => {
                        tracing::debug!("peer closed the channel");
                        break;
                    }
                    Ok(WsMessage::Binary(_)) => {
                        tracing::debug!("ignoring binary frame");
                    }
                    Ok(_) => {}
                    Err(err) => {
                        return Err(Error::Transport(err.to_string()));
                    }
                }
            }
            Ok(())
        })
    }
}
