//! Wire types shared by the uidriver runtime, core, and CLI.
//!
//! Everything in this crate maps 1:1 onto the JSON shapes the debuggable
//! host application speaks: target descriptors served by the discovery
//! endpoint, document nodes, remote values returned from script
//! evaluation, and screenshot options. No I/O happens here.

pub mod options;
pub mod types;

pub use options::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_MS, HOST_ENV_VAR, PORT_ENV_VAR,
    ScreenshotFormat, ScreenshotOptions,
};
pub use types::{
    CallFrame, DOCUMENT_NODE_TYPE, DocumentNode, ELEMENT_NODE_TYPE, ExceptionDetails, RemoteObject,
    RemoteValue, StackTrace, Target, TargetKind,
};
