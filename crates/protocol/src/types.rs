//! Protocol data shapes: targets, document nodes, and evaluation results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `nodeType` of a document root node.
pub const DOCUMENT_NODE_TYPE: i64 = 9;

/// `nodeType` of an element node.
pub const ELEMENT_NODE_TYPE: i64 = 1;

/// Category of a discovered target.
///
/// Only `Page` targets are auto-connectable; anything the directory
/// reports that we do not recognize collapses into `Other` rather than
/// failing the whole discovery call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Page,
    Webview,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::Page => write!(f, "page"),
            TargetKind::Webview => write!(f, "webview"),
            TargetKind::Other => write!(f, "other"),
        }
    }
}

/// One debuggable window/surface as reported by the discovery endpoint.
///
/// Immutable once discovered; a fresh discovery call replaces the whole
/// set. The `id` is stable for the lifetime of the host process only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TargetKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Address of the target's message channel. Targets without one
    /// cannot be connected to.
    #[serde(rename = "webSocketDebuggerUrl", skip_serializing_if = "Option::is_none")]
    pub channel_address: Option<String>,
    #[serde(rename = "devtoolsFrontendUrl", skip_serializing_if = "Option::is_none")]
    pub frontend_url: Option<String>,
}

/// One node of a document snapshot.
///
/// `attributes` is the wire encoding: a flat list alternating name and
/// value. Node ids are only meaningful within the snapshot they came
/// from and must not be cached across a reconnect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub node_id: i64,
    pub node_type: i64,
    pub node_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_node_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DocumentNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    /// Document of an embedded frame, if this node hosts one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_document: Option<Box<DocumentNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_roots: Option<Vec<DocumentNode>>,
}

/// Raw value descriptor returned by the script-execution domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Decoded evaluation result.
///
/// Closed sum over what script evaluation can hand back by value; the
/// "the expression threw" case is an error, not a variant, so callers
/// can always treat a `RemoteValue` as a success.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteValue {
    Undefined,
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Object(Value),
}

impl RemoteValue {
    /// Decodes a [`RemoteObject`] into its structured form.
    pub fn from_remote_object(object: RemoteObject) -> Self {
        match object.kind.as_str() {
            "undefined" => RemoteValue::Undefined,
            "object" if object.subtype.as_deref() == Some("null") => RemoteValue::Null,
            "boolean" => match object.value.as_ref().and_then(Value::as_bool) {
                Some(flag) => RemoteValue::Bool(flag),
                None => RemoteValue::Undefined,
            },
            "number" => match object.value {
                Some(Value::Number(number)) => RemoteValue::Number(number),
                _ => RemoteValue::Undefined,
            },
            "string" => match object.value {
                Some(Value::String(text)) => RemoteValue::String(text),
                _ => RemoteValue::String(String::new()),
            },
            _ => match object.value {
                Some(value) => RemoteValue::Object(value),
                // Functions and symbols carry no value; the description
                // is the best representation available.
                None => match object.description {
                    Some(description) => RemoteValue::String(description),
                    None => RemoteValue::Undefined,
                },
            },
        }
    }

    /// Converts into plain JSON for display. `Undefined` becomes `null`.
    pub fn into_json(self) -> Value {
        match self {
            RemoteValue::Undefined | RemoteValue::Null => Value::Null,
            RemoteValue::Bool(flag) => Value::Bool(flag),
            RemoteValue::Number(number) => Value::Number(number),
            RemoteValue::String(text) => Value::String(text),
            RemoteValue::Object(value) => value,
        }
    }
}

/// One frame of a script stack trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(default)]
    pub function_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    #[serde(default)]
    pub call_frames: Vec<CallFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Details of an exception thrown inside the target's script context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    pub text: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<RemoteObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<StackTrace>,
}

impl ExceptionDetails {
    /// The most descriptive single-line message available.
    pub fn message(&self) -> String {
        self.exception
            .as_ref()
            .and_then(|exception| exception.description.clone())
            .unwrap_or_else(|| self.text.clone())
    }

    /// Formats the stack trace, one `at ...` line per frame.
    pub fn stack(&self) -> Option<String> {
        let trace = self.stack_trace.as_ref()?;
        if trace.call_frames.is_empty() {
            return None;
        }
        let lines: Vec<String> = trace
            .call_frames
            .iter()
            .map(|frame| {
                let name = if frame.function_name.is_empty() {
                    "<anonymous>"
                } else {
                    &frame.function_name
                };
                format!(
                    "    at {} ({}:{}:{})",
                    name, frame.url, frame.line_number, frame.column_number
                )
            })
            .collect();
        Some(lines.join("\n"))
    }
}
