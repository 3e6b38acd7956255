use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Driver(#[from] uidriver::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    /// Maps this error onto the stable envelope representation. The
    /// message is passed through unmodified.
    pub fn to_command_error(&self) -> CommandError {
        let (code, details) = match self {
            CliError::Driver(err) => driver_code(err),
            CliError::InvalidInput(_) => (ErrorCode::InvalidInput, None),
            CliError::Io(_) => (ErrorCode::IoError, None),
            CliError::Json(_) => (ErrorCode::InternalError, None),
            CliError::Anyhow(_) => (ErrorCode::InternalError, None),
        };
        CommandError {
            code,
            message: self.to_string(),
            details,
        }
    }
}

fn driver_code(err: &uidriver::Error) -> (ErrorCode, Option<serde_json::Value>) {
    use uidriver::Error;
    match err {
        Error::Discovery(_) => (ErrorCode::DiscoveryFailed, None),
        Error::NoTargets(_) => (ErrorCode::NoTargets, None),
        Error::NotConnected => (ErrorCode::NotConnected, None),
        Error::Script { stack, .. } => (
            ErrorCode::ScriptError,
            stack
                .as_ref()
                .map(|stack| serde_json::json!({"stack": stack})),
        ),
        Error::Timeout(_) => (ErrorCode::Timeout, None),
        Error::Capability { capability, .. } => (
            ErrorCode::CapabilityDenied,
            Some(serde_json::json!({"capability": capability})),
        ),
        Error::InvalidArgument(_) => (ErrorCode::InvalidInput, None),
        Error::ConnectionFailed(_)
        | Error::Transport(_)
        | Error::Protocol(_)
        | Error::ChannelClosed => (ErrorCode::ProtocolError, None),
        Error::Io(_) => (ErrorCode::IoError, None),
        Error::Json(_) => (ErrorCode::InternalError, None),
    }
}
