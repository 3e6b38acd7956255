//! One open conversation with a single target.

use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uidriver_protocol::types::{DocumentNode, ExceptionDetails, RemoteObject, RemoteValue};
use uidriver_protocol::{ScreenshotOptions, Target};
use uidriver_runtime::{Connection, Error, Result, WebSocketTransport};

/// Capability domains enabled on every session, in order. All of them
/// must come up before the session is usable.
pub const ENABLED_DOMAINS: [&str; 4] = ["DOM", "Runtime", "Page", "Network"];

/// Session lifecycle. `Connecting` exists only while `connect()` is in
/// flight; `Disconnected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Connecting,
    Connected,
    Disconnected,
}

/// A session exclusively owns its channel; no two sessions share one.
///
/// Operations never reconnect implicitly: anything issued while the
/// session is not `Connected` fails fast with [`Error::NotConnected`].
/// Reconnection policy belongs to [`crate::AutoConnectPolicy`].
pub struct Session {
    target_id: String,
    channel_address: String,
    request_timeout: Duration,
    state: Mutex<SessionState>,
    connection: Mutex<Option<Arc<Connection>>>,
    run_handle: Mutex<Option<JoinHandle<()>>>,
    enabled_domains: Mutex<Vec<String>>,
    /// Serializes connect attempts so concurrent callers coalesce onto
    /// one in-flight channel instead of racing to open two.
    connect_lock: tokio::sync::Mutex<()>,
}

impl Session {
    /// Creates an unconnected session for `target`.
    ///
    /// Fails when the target descriptor exposes no channel address.
    pub fn for_target(target: &Target, request_timeout: Duration) -> Result<Self> {
        let address = target.channel_address.clone().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "target {} ({}) exposes no channel address",
                target.id, target.kind
            ))
        })?;
        Ok(Self::new(&target.id, address, request_timeout))
    }

    pub fn new(
        target_id: impl Into<String>,
        channel_address: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            channel_address: channel_address.into(),
            request_timeout,
            state: Mutex::new(SessionState::Unconnected),
            connection: Mutex::new(None),
            run_handle: Mutex::new(None),
            enabled_domains: Mutex::new(Vec::new()),
            connect_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// Domains successfully enabled on this session.
    pub fn enabled_domains(&self) -> Vec<String> {
        self.enabled_domains.lock().clone()
    }

    /// Opens the channel and enables every capability domain.
    ///
    /// Idempotent: a connected session returns immediately without
    /// re-issuing enables, and a concurrent caller awaits the in-flight
    /// attempt rather than opening a second channel. If any enable fails
    /// the channel is torn down; a half-open session is never exposed.
    pub async fn connect(&self) -> Result<()> {
        let _guard = self.connect_lock.lock().await;

        match self.state() {
            SessionState::Connected => return Ok(()),
            SessionState::Disconnected => {
                return Err(Error::Protocol(format!(
                    "session for target {} was disconnected; open a new session instead",
                    self.target_id
                )));
            }
            SessionState::Unconnected | SessionState::Connecting => {}
        }

        *self.state.lock() = SessionState::Connecting;
        match self.open_channel().await {
            Ok(()) => {
                *self.state.lock() = SessionState::Connected;
                tracing::debug!(target_id = %self.target_id, "session connected");
                Ok(())
            }
            Err(err) => {
                *self.state.lock() = SessionState::Unconnected;
                Err(err)
            }
        }
    }

    async fn open_channel(&self) -> Result<()> {
        let parts = WebSocketTransport::connect(&self.channel_address).await?;
        let connection = Arc::new(Connection::with_request_timeout(parts, self.request_timeout));

        let run_connection = Arc::clone(&connection);
        let run_handle = tokio::spawn(async move { run_connection.run().await });

        // Enables are issued concurrently; the session only counts as
        // connected once every one of them succeeded.
        let enables = ENABLED_DOMAINS.iter().map(|domain| {
            let connection = Arc::clone(&connection);
            async move {
                connection
                    .send_message(&format!("{domain}.enable"), Value::Null)
                    .await
                    .map_err(|err| {
                        Error::Protocol(format!("failed to enable {domain} domain: {err}"))
                    })
            }
        });

        let failure = futures_util::future::join_all(enables)
            .await
            .into_iter()
            .find_map(|outcome| outcome.err());

        if let Some(err) = failure {
            connection.close().await;
            run_handle.abort();
            return Err(err);
        }

        *self.connection.lock() = Some(connection);
        *self.run_handle.lock() = Some(run_handle);
        *self.enabled_domains.lock() = ENABLED_DOMAINS.iter().map(|d| d.to_string()).collect();
        Ok(())
    }

    /// Closes the channel and moves the session to its terminal state.
    pub async fn close(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if *state == SessionState::Disconnected {
                return Ok(());
            }
            *state = SessionState::Disconnected;
        }

        let connection = self.connection.lock().take();
        let run_handle = self.run_handle.lock().take();
        self.enabled_domains.lock().clear();

        if let Some(connection) = connection {
            connection.close().await;
        }
        if let Some(handle) = run_handle {
            handle.abort();
        }
        tracing::debug!(target_id = %self.target_id, "session closed");
        Ok(())
    }

    fn channel(&self) -> Result<Arc<Connection>> {
        if self.state() != SessionState::Connected {
            return Err(Error::NotConnected);
        }
        self.connection.lock().clone().ok_or(Error::NotConnected)
    }

    /// Fetches a full document snapshot, unbounded depth, piercing
    /// embedded frames and shadow content.
    pub async fn get_document(&self) -> Result<DocumentNode> {
        let channel = self.channel()?;
        let result = channel
            .send_message("DOM.getDocument", json!({"depth": -1, "pierce": true}))
            .await?;
        let root = result
            .get("root")
            .cloned()
            .ok_or_else(|| Error::Protocol("DOM.getDocument response missing 'root'".into()))?;
        serde_json::from_value(root)
            .map_err(|err| Error::Protocol(format!("malformed document node: {err}")))
    }

    /// Resolves the first node matching `selector`, or `None` when
    /// nothing matches. A missing element is an expected outcome, not a
    /// failure.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<i64>> {
        let channel = self.channel()?;
        let root = self.document_root(&channel).await?;
        let result = channel
            .send_message(
                "DOM.querySelector",
                json!({"nodeId": root, "selector": selector}),
            )
            .await?;
        let node_id = result
            .get("nodeId")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Protocol("DOM.querySelector response missing 'nodeId'".into()))?;
        Ok(if node_id == 0 { None } else { Some(node_id) })
    }

    /// Resolves every node matching `selector`, in document order. An
    /// empty result is a success.
    pub async fn query_selector_all(&self, selector: &str) -> Result<Vec<i64>> {
        let channel = self.channel()?;
        let root = self.document_root(&channel).await?;
        let result = channel
            .send_message(
                "DOM.querySelectorAll",
                json!({"nodeId": root, "selector": selector}),
            )
            .await?;
        let node_ids = result.get("nodeIds").cloned().ok_or_else(|| {
            Error::Protocol("DOM.querySelectorAll response missing 'nodeIds'".into())
        })?;
        serde_json::from_value(node_ids)
            .map_err(|err| Error::Protocol(format!("malformed node id list: {err}")))
    }

    /// Fetches a node's attributes and folds the flat alternating
    /// name/value encoding into a map.
    pub async fn get_node_attributes(&self, node_id: i64) -> Result<BTreeMap<String, String>> {
        let channel = self.channel()?;
        let result = channel
            .send_message("DOM.getAttributes", json!({"nodeId": node_id}))
            .await?;
        let flat: Vec<String> = result
            .get("attributes")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|err| Error::Protocol(format!("malformed attribute list: {err}")))?
            .ok_or_else(|| {
                Error::Protocol("DOM.getAttributes response missing 'attributes'".into())
            })?;

        if flat.len() % 2 != 0 {
            return Err(Error::Protocol(format!(
                "attribute list has odd length {}",
                flat.len()
            )));
        }

        let mut attributes = BTreeMap::new();
        for pair in flat.chunks_exact(2) {
            attributes.insert(pair[0].clone(), pair[1].clone());
        }
        Ok(attributes)
    }

    /// Returns a node's outer HTML.
    pub async fn get_outer_html(&self, node_id: i64) -> Result<String> {
        let channel = self.channel()?;
        let result = channel
            .send_message("DOM.getOuterHTML", json!({"nodeId": node_id}))
            .await?;
        result
            .get("outerHTML")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Protocol("DOM.getOuterHTML response missing 'outerHTML'".into()))
    }

    /// Evaluates `expression` inside the target's script context and
    /// returns the result by value.
    ///
    /// An exception raised by the expression itself surfaces as
    /// [`Error::Script`] carrying the target-reported message and trace,
    /// never as a protocol failure.
    pub async fn evaluate(&self, expression: &str) -> Result<RemoteValue> {
        let channel = self.channel()?;
        let result = channel
            .send_message(
                "Runtime.evaluate",
                json!({"expression": expression, "returnByValue": true}),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let details: ExceptionDetails = serde_json::from_value(details.clone())
                .map_err(|err| Error::Protocol(format!("malformed exception details: {err}")))?;
            return Err(Error::Script {
                message: details.message(),
                stack: details.stack(),
            });
        }

        let object: RemoteObject = result
            .get("result")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|err| Error::Protocol(format!("malformed evaluation result: {err}")))?
            .ok_or_else(|| Error::Protocol("Runtime.evaluate response missing 'result'".into()))?;

        Ok(RemoteValue::from_remote_object(object))
    }

    /// Captures the target's visual output. The payload is the encoded
    /// image exactly as the target produced it; no decoding happens here.
    pub async fn screenshot(&self, options: ScreenshotOptions) -> Result<String> {
        if let Some(quality) = options.quality {
            if !options.format.supports_quality() {
                return Err(Error::InvalidArgument(format!(
                    "quality only applies to lossy formats, not {}",
                    options.format
                )));
            }
            if quality > 100 {
                return Err(Error::InvalidArgument(format!(
                    "quality must be 0-100, got {quality}"
                )));
            }
        }

        let channel = self.channel()?;
        let mut params = json!({"format": options.format.as_str()});
        if let Some(quality) = options.quality {
            params["quality"] = json!(quality);
        }

        let result = channel.send_message("Page.captureScreenshot", params).await?;
        result
            .get("data")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Protocol("Page.captureScreenshot response missing 'data'".into())
            })
    }

    async fn document_root(&self, channel: &Arc<Connection>) -> Result<i64> {
        let result = channel
            .send_message("DOM.getDocument", json!({"depth": 0}))
            .await?;
        result
            .get("root")
            .and_then(|root| root.get("nodeId"))
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Protocol("DOM.getDocument response missing root node id".into()))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("target_id", &self.target_id)
            .field("state", &self.state())
            .finish()
    }
}
