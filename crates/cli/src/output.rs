//! Structured output envelope for all CLI commands.
//!
//! Every command prints exactly one result envelope on stdout:
//!
//! ```json
//! {
//!   "ok": true,
//!   "command": "query",
//!   "data": { ... },
//!   "timings": { "durationMs": 12 }
//! }
//! ```
//!
//! On failure the envelope carries `"ok": false` and an `error` object
//! with a stable code and the unmodified human-readable message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output (default)
    #[default]
    Json,
    /// Newline-delimited JSON (streaming)
    Ndjson,
    /// Human-readable text
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "ndjson" => Ok(OutputFormat::Ndjson),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

/// The result envelope returned by every command.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
    /// Whether the command succeeded
    pub ok: bool,

    /// Command name (e.g. "query", "eval", "screenshot")
    pub command: String,

    /// Command-specific result data (only present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error information (only present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<Timings>,
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    /// Stable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable message, surfaced unmodified
    pub message: String,

    /// Additional detail (stack trace, offending input, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Standardized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Directory endpoint unreachable or malformed
    DiscoveryFailed,
    /// Discovery produced no connectable targets
    NoTargets,
    /// Operation issued without a connected session
    NotConnected,
    /// Channel-level protocol failure
    ProtocolError,
    /// The target's own script raised
    ScriptError,
    /// Request deadline expired
    Timeout,
    /// OS capability grant missing
    CapabilityDenied,
    /// Invalid input provided
    InvalidInput,
    /// File I/O error
    IoError,
    /// Unknown/internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ErrorCode::DiscoveryFailed => "DISCOVERY_FAILED",
            ErrorCode::NoTargets => "NO_TARGETS",
            ErrorCode::NotConnected => "NOT_CONNECTED",
            ErrorCode::ProtocolError => "PROTOCOL_ERROR",
            ErrorCode::ScriptError => "SCRIPT_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::CapabilityDenied => "CAPABILITY_DENIED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(code)
    }
}

/// Timing information for the command.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
    pub duration_ms: u64,
}

impl From<Duration> for Timings {
    fn from(duration: Duration) -> Self {
        Timings {
            duration_ms: duration.as_millis() as u64,
        }
    }
}

/// Builder for command results.
pub struct ResultBuilder<T: Serialize> {
    command: String,
    data: Option<T>,
    error: Option<CommandError>,
    start_time: Instant,
}

impl<T: Serialize> ResultBuilder<T> {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            data: None,
            error: None,
            start_time: Instant::now(),
        }
    }

    /// Sets the successful result data.
    pub fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets an error by code and message.
    pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
        self.error = Some(CommandError {
            code,
            message: message.into(),
            details: None,
        });
        self
    }

    /// Sets a pre-built error.
    pub fn fail(mut self, error: CommandError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn build(self) -> CommandResult<T> {
        let ok = self.error.is_none() && self.data.is_some();
        CommandResult {
            ok,
            command: self.command,
            data: self.data,
            error: self.error,
            timings: Some(Timings::from(self.start_time.elapsed())),
        }
    }
}

/// Prints a command result to stdout in the requested format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{json}");
            }
        }
        OutputFormat::Ndjson => {
            if let Ok(json) = serde_json::to_string(result) {
                println!("{json}");
            }
        }
        OutputFormat::Text => print_result_text(result),
    }
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
    let mut stdout = io::stdout().lock();

    if result.ok {
        if let Some(ref data) = result.data {
            if let Ok(json) = serde_json::to_string_pretty(data) {
                let _ = writeln!(stdout, "{json}");
            }
        }
    } else if let Some(ref error) = result.error {
        let _ = writeln!(stdout, "Error [{}]: {}", error.code, error.message);
        if let Some(ref details) = error.details {
            if let Ok(json) = serde_json::to_string_pretty(details) {
                let _ = writeln!(stdout, "Details: {json}");
            }
        }
    }

    if let Some(ref timings) = result.timings {
        let _ = writeln!(stdout, "Completed in {}ms", timings.duration_ms);
    }
}
