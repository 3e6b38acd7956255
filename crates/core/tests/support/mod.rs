//! In-process mock of a debuggable host application.
//!
//! Serves the directory endpoint at `/json/list` and one WebSocket
//! channel per target at `/session/{id}`, speaking just enough of the
//! protocol for the integration tests: domain enables, a small canned
//! document, selector queries, attribute lookups, script evaluation, and
//! screenshot capture.

#![allow(dead_code)]

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Base64 of the bytes the mock "captures" for screenshots.
pub const SCREENSHOT_PAYLOAD: &str = "bW9jay1pbWFnZS1ieXRlcw==";

/// Selector the mock resolves to node id 7.
pub const APP_SELECTOR: &str = "#app";

/// Node id whose attribute list is deliberately odd-length.
pub const ODD_ATTRIBUTES_NODE: i64 = 13;

#[derive(Clone)]
pub struct TargetSpec {
    pub id: &'static str,
    pub kind: &'static str,
}

pub struct HostOptions {
    pub targets: Vec<TargetSpec>,
    /// Domains whose enable request fails with a remote error.
    pub failing_domains: Vec<&'static str>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            targets: vec![TargetSpec {
                id: "page-1",
                kind: "page",
            }],
            failing_domains: Vec::new(),
        }
    }
}

struct HostState {
    addr: SocketAddr,
    options: HostOptions,
    channels_opened: AtomicUsize,
}

/// Handle to a running mock host.
pub struct MockHost {
    addr: SocketAddr,
    state: Arc<HostState>,
}

impl MockHost {
    pub async fn spawn(options: HostOptions) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(HostState {
            addr,
            options,
            channels_opened: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/json/list", get(list_targets))
            .route("/session/{id}", get(open_channel))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub async fn spawn_default() -> Self {
        Self::spawn(HostOptions::default()).await
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// How many channels were ever opened against this host.
    pub fn channels_opened(&self) -> usize {
        self.state.channels_opened.load(Ordering::SeqCst)
    }

    /// Builds the target descriptor the directory would serve for `id`.
    pub fn target(&self, id: &str) -> uidriver_protocol::Target {
        uidriver_protocol::Target {
            id: id.to_string(),
            kind: uidriver_protocol::TargetKind::Page,
            title: format!("{id} window"),
            url: "app://main".into(),
            channel_address: Some(format!("ws://{}/session/{id}", self.addr)),
            frontend_url: None,
        }
    }
}

async fn list_targets(State(state): State<Arc<HostState>>) -> impl IntoResponse {
    let entries: Vec<Value> = state
        .options
        .targets
        .iter()
        .map(|spec| {
            json!({
                "id": spec.id,
                "type": spec.kind,
                "title": format!("{} window", spec.id),
                "url": "app://main",
                "webSocketDebuggerUrl": format!("ws://{}/session/{}", state.addr, spec.id),
            })
        })
        .collect();
    axum::Json(entries)
}

async fn open_channel(
    ws: WebSocketUpgrade,
    Path(_id): Path<String>,
    State(state): State<Arc<HostState>>,
) -> impl IntoResponse {
    state.channels_opened.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| serve_channel(socket, state))
}

async fn serve_channel(mut socket: WebSocket, state: Arc<HostState>) {
    while let Some(Ok(message)) = socket.recv().await {
        let Message::Text(text) = message else {
            continue;
        };
        let Ok(request) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        let Some(id) = request["id"].as_u64() else {
            continue;
        };
        let method = request["method"].as_str().unwrap_or_default();
        let params = request["params"].clone();

        let reply = respond(&state, id, method, &params);
        if socket
            .send(Message::Text(reply.to_string().into()))
            .await
            .is_err()
        {
            break;
        }
    }
}

fn respond(state: &HostState, id: u64, method: &str, params: &Value) -> Value {
    if let Some(domain) = method.strip_suffix(".enable") {
        if state.options.failing_domains.contains(&domain) {
            return error_reply(id, format!("{domain} domain is unavailable"));
        }
        return json!({"id": id, "result": {}});
    }

    match method {
        "DOM.getDocument" => json!({"id": id, "result": {"root": document_tree()}}),
        "DOM.querySelector" => {
            let node_id = match params["selector"].as_str() {
                Some(APP_SELECTOR) => 7,
                Some("button") => 5,
                _ => 0,
            };
            json!({"id": id, "result": {"nodeId": node_id}})
        }
        "DOM.querySelectorAll" => {
            let node_ids: Vec<i64> = match params["selector"].as_str() {
                Some("button") => vec![5, 6],
                Some(APP_SELECTOR) => vec![7],
                _ => Vec::new(),
            };
            json!({"id": id, "result": {"nodeIds": node_ids}})
        }
        "DOM.getAttributes" => {
            let attributes: Vec<&str> = match params["nodeId"].as_i64() {
                Some(7) => vec!["id", "app", "class", "main"],
                Some(n) if n == ODD_ATTRIBUTES_NODE => vec!["id", "broken", "data-x"],
                _ => Vec::new(),
            };
            json!({"id": id, "result": {"attributes": attributes}})
        }
        "DOM.getOuterHTML" => {
            json!({"id": id, "result": {"outerHTML": "<div id=\"app\" class=\"main\"></div>"}})
        }
        "Runtime.evaluate" => evaluate_reply(id, params["expression"].as_str().unwrap_or_default()),
        "Page.captureScreenshot" => json!({"id": id, "result": {"data": SCREENSHOT_PAYLOAD}}),
        _ => error_reply(id, format!("'{method}' wasn't found")),
    }
}

fn evaluate_reply(id: u64, expression: &str) -> Value {
    if expression.contains("null.x") {
        return json!({
            "id": id,
            "result": {
                "result": {
                    "type": "object",
                    "subtype": "error",
                    "description": "TypeError: Cannot read properties of null (reading 'x')"
                },
                "exceptionDetails": {
                    "text": "Uncaught",
                    "lineNumber": 1,
                    "columnNumber": 6,
                    "exception": {
                        "type": "object",
                        "subtype": "error",
                        "description": "TypeError: Cannot read properties of null (reading 'x')"
                    },
                    "stackTrace": {
                        "callFrames": [{
                            "functionName": "",
                            "url": "app://main",
                            "lineNumber": 1,
                            "columnNumber": 6
                        }]
                    }
                }
            }
        });
    }

    let result = match expression {
        "1+1" => json!({"type": "number", "value": 2}),
        "document.title" => json!({"type": "string", "value": "Mock Window"}),
        _ => json!({"type": "undefined"}),
    };
    json!({"id": id, "result": {"result": result}})
}

fn error_reply(id: u64, message: String) -> Value {
    json!({"id": id, "error": {"code": -32000, "message": message}})
}

fn document_tree() -> Value {
    json!({
        "nodeId": 1,
        "nodeType": 9,
        "nodeName": "#document",
        "childNodeCount": 1,
        "children": [{
            "nodeId": 2,
            "nodeType": 1,
            "nodeName": "HTML",
            "attributes": ["lang", "en"],
            "childNodeCount": 1,
            "children": [{
                "nodeId": 7,
                "nodeType": 1,
                "nodeName": "DIV",
                "attributes": ["id", "app", "class", "main"],
                "childNodeCount": 0
            }]
        }]
    })
}
