//! Error types shared across the uidriver crates.

use thiserror::Error;

/// Result type alias for uidriver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a target.
#[derive(Debug, Error)]
pub enum Error {
    /// The discovery endpoint was unreachable or returned malformed data.
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// Opening the message channel to a target failed.
    #[error("Failed to connect to target channel: {0}")]
    ConnectionFailed(String),

    /// Transport-level failure (socket read/write).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Channel-level failure: malformed response, enable failure, or a
    /// protocol invariant violation.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// An operation was issued on a session that is not connected.
    #[error("Session not connected. Call connect() before issuing operations.")]
    NotConnected,

    /// The remote target's own script raised. Distinct from [`Error::Protocol`]
    /// so callers can tell "my code failed" from "the connection failed".
    #[error("Script exception: {message}")]
    Script {
        message: String,
        stack: Option<String>,
    },

    /// Discovery produced no connectable targets.
    #[error("No debuggable targets found: {0}")]
    NoTargets(String),

    /// An OS capability grant is missing.
    #[error("{capability} permission not granted. {remediation}")]
    Capability {
        capability: String,
        remediation: String,
    },

    /// A request deadline expired. Only the one correlation id is
    /// rejected; other in-flight requests are untouched.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The channel closed while requests were still pending.
    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    /// Invalid argument provided to an operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for channel-level failures a caller cannot recover from
    /// without reconnecting.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Error::Protocol(_) | Error::NotConnected | Error::ChannelClosed
        )
    }

    /// True when the remote target's own code raised.
    pub fn is_script(&self) -> bool {
        matches!(self, Error::Script { .. })
    }

    pub fn is_not_connected(&self) -> bool {
        matches!(self, Error::NotConnected)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// Stack trace reported by the target, if this is a script error.
    pub fn script_stack(&self) -> Option<&str> {
        match self {
            Error::Script { stack, .. } => stack.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_errors_are_not_protocol_errors() {
        let script = Error::Script {
            message: "TypeError: null has no properties".into(),
            stack: Some("    at <anonymous> (app://main:1:1)".into()),
        };
        assert!(script.is_script());
        assert!(!script.is_protocol());
        assert!(script.script_stack().unwrap().contains("app://main"));

        let protocol = Error::Protocol("attribute list has odd length 3".into());
        assert!(protocol.is_protocol());
        assert!(!protocol.is_script());
    }

    #[test]
    fn not_connected_reads_as_protocol_failure() {
        assert!(Error::NotConnected.is_protocol());
        assert!(Error::NotConnected.is_not_connected());
        assert!(Error::ChannelClosed.is_protocol());
    }
}
