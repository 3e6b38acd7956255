//! Request/response correlation on top of the transport.
//!
//! Every outbound request carries a fresh correlation id and parks a
//! oneshot callback in the pending table. The dispatch loop resolves the
//! callback when the correlated response arrives. An id is retired the
//! instant its response arrives, its deadline expires, its caller drops
//! the future, or the channel closes, whichever comes first; it is never
//! reused while pending.

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportParts, TransportReceiver};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::Mutex as TokioMutex;
use tokio::sync::{Notify, mpsc, oneshot};
use uidriver_protocol::options::DEFAULT_REQUEST_TIMEOUT_MS;

/// Request frame sent to the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id; unique among in-flight requests on this channel.
    pub id: u64,
    /// Qualified method name, e.g. `DOM.getDocument`.
    pub method: String,
    /// Method parameters. Omitted on the wire when null (domain enables
    /// carry no payload).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

/// Response frame from the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

/// Channel-level error payload attached to a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Out-of-band event frame. This client enables event-bearing domains
/// but consumes no events; they are logged and dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Discriminated union of incoming frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    /// Correlated response (has an `id` field).
    Response(Response),
    /// Event (has a `method` but no `id`).
    Event(Event),
    /// Forward-compatible catch-all.
    Unknown(Value),
}

/// Pending request callbacks keyed by correlation id.
type CallbackMap = Arc<TokioMutex<HashMap<u64, oneshot::Sender<Result<Value>>>>>;

/// RAII guard retiring a correlation id when the caller's future is
/// dropped before the response arrives.
struct CancelGuard {
    id: u64,
    callbacks: CallbackMap,
    completed: bool,
}

impl CancelGuard {
    fn new(id: u64, callbacks: CallbackMap) -> Self {
        Self {
            id,
            callbacks,
            completed: false,
        }
    }

    fn complete(&mut self) {
        self.completed = true;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.completed {
            return;
        }

        let id = self.id;
        let callbacks = Arc::clone(&self.callbacks);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if callbacks.lock().await.remove(&id).is_some() {
                    tracing::debug!(id, "retired correlation id of abandoned request");
                }
            });
        }
    }
}

/// Future resolving to a correlated response, with cancellation cleanup.
struct ResponseFuture {
    rx: oneshot::Receiver<Result<Value>>,
    guard: CancelGuard,
}

impl Future for ResponseFuture {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(result) => {
                self.guard.complete();
                Poll::Ready(result.map_err(|_| Error::ChannelClosed).and_then(|r| r))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// One correlated conversation over a transport channel.
///
/// Safe for concurrent issuance: any number of logical callers may have
/// requests in flight at once, and responses may arrive out of order.
pub struct Connection {
    /// Correlation id counter; first issued id is 1.
    last_id: AtomicU64,
    callbacks: CallbackMap,
    /// Queue drained by the writer task.
    outbound_tx: mpsc::UnboundedSender<Value>,
    outbound_rx: TokioMutex<Option<mpsc::UnboundedReceiver<Value>>>,
    transport_sender: TokioMutex<Option<Box<dyn Transport>>>,
    transport_receiver: TokioMutex<Option<Box<dyn TransportReceiver>>>,
    message_rx: TokioMutex<Option<mpsc::UnboundedReceiver<Value>>>,
    /// Deadline applied to every request on this channel.
    request_timeout: Duration,
    shutdown: Notify,
}

impl Connection {
    /// Creates a connection with the default request deadline.
    pub fn new(parts: TransportParts) -> Self {
        Self::with_request_timeout(parts, Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    pub fn with_request_timeout(parts: TransportParts, request_timeout: Duration) -> Self {
        let TransportParts {
            sender,
            receiver,
            message_rx,
        } = parts;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        Self {
            last_id: AtomicU64::new(0),
            callbacks: Arc::new(TokioMutex::new(HashMap::new())),
            outbound_tx,
            outbound_rx: TokioMutex::new(Some(outbound_rx)),
            transport_sender: TokioMutex::new(Some(sender)),
            transport_receiver: TokioMutex::new(Some(receiver)),
            message_rx: TokioMutex::new(Some(message_rx)),
            request_timeout,
            shutdown: Notify::new(),
        }
    }

    /// Sends a request and awaits its correlated response.
    ///
    /// Expiry of the deadline rejects only this request's correlation id;
    /// other requests sharing the channel are untouched.
    pub async fn send_message(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!(id, %method, "sending request");

        let (tx, rx) = oneshot::channel();
        self.callbacks.lock().await.insert(id, tx);

        let guard = CancelGuard::new(id, Arc::clone(&self.callbacks));

        let request = Request {
            id,
            method: method.to_string(),
            params,
        };

        let request_value = serde_json::to_value(&request)?;
        if self.outbound_tx.send(request_value).is_err() {
            return Err(Error::ChannelClosed);
        }

        match tokio::time::timeout(self.request_timeout, ResponseFuture { rx, guard }).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "no response to '{method}' within {}ms",
                self.request_timeout.as_millis()
            ))),
        }
    }

    /// Runs the channel: spawns the reader and writer tasks and dispatches
    /// incoming frames until the channel ends. Call exactly once.
    pub async fn run(self: &Arc<Self>) {
        let receiver = self
            .transport_receiver
            .lock()
            .await
            .take()
            .expect("run() can only be called once - transport receiver already taken");

        let mut sender = self
            .transport_sender
            .lock()
            .await
            .take()
            .expect("run() can only be called once - transport sender already taken");

        let mut outbound_rx = self
            .outbound_rx
            .lock()
            .await
            .take()
            .expect("run() can only be called once - outbound receiver already taken");

        let mut message_rx = self
            .message_rx
            .lock()
            .await
            .take()
            .expect("run() can only be called once - message receiver already taken");

        let reader_handle = tokio::spawn(async move {
            if let Err(err) = receiver.run().await {
                tracing::debug!(error = %err, "transport read loop ended");
            }
        });

        let writer_conn = Arc::clone(self);
        let writer_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    message = outbound_rx.recv() => match message {
                        Some(message) => {
                            if let Err(err) = sender.send(message).await {
                                tracing::error!(error = %err, "transport write failed");
                                break;
                            }
                        }
                        None => break,
                    },
                    _ = writer_conn.shutdown.notified() => {
                        if let Err(err) = sender.close().await {
                            tracing::debug!(error = %err, "close frame not delivered");
                        }
                        break;
                    }
                }
            }
        });

        while let Some(message_value) = message_rx.recv().await {
            match serde_json::from_value::<Message>(message_value) {
                Ok(message) => {
                    if let Err(err) = self.dispatch(message).await {
                        tracing::error!(error = %err, "failed to dispatch message");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to parse message");
                }
            }
        }

        // Channel is gone; nothing pending can ever complete.
        self.fail_pending().await;

        let _ = reader_handle.await;
        let _ = writer_handle.await;
    }

    /// Initiates shutdown: asks the writer to send a close frame and
    /// rejects everything still pending.
    pub async fn close(&self) {
        self.shutdown.notify_one();
        self.fail_pending().await;
    }

    async fn fail_pending(&self) {
        let pending: Vec<(u64, oneshot::Sender<Result<Value>>)> =
            self.callbacks.lock().await.drain().collect();
        for (id, callback) in pending {
            tracing::debug!(id, "rejecting pending request: channel closed");
            let _ = callback.send(Err(Error::ChannelClosed));
        }
    }

    async fn dispatch(self: &Arc<Self>, message: Message) -> Result<()> {
        match message {
            Message::Response(response) => {
                let callback = self
                    .callbacks
                    .lock()
                    .await
                    .remove(&response.id)
                    .ok_or_else(|| {
                        Error::Protocol(format!(
                            "response for unknown or retired request id {}",
                            response.id
                        ))
                    })?;

                let result = match response.error {
                    Some(error) => Err(remote_error(error)),
                    None => Ok(response.result.unwrap_or(Value::Null)),
                };

                let _ = callback.send(result);
                Ok(())
            }
            Message::Event(event) => {
                // No event consumers in this client.
                tracing::debug!(method = %event.method, "protocol event (ignored)");
                Ok(())
            }
            Message::Unknown(value) => {
                tracing::debug!(
                    "unknown message shape (ignored): {}",
                    serde_json::to_string(&value).unwrap_or_else(|_| "<unserializable>".into())
                );
                Ok(())
            }
        }
    }
}

/// Converts a response-level error payload into [`Error::Protocol`].
fn remote_error(payload: ErrorPayload) -> Error {
    let mut message = format!("remote error {}: {}", payload.code, payload.message);
    if let Some(data) = payload.data {
        message.push_str(&format!(" ({data})"));
    }
    Error::Protocol(message)
}
