//! uidriver runtime: transport channel and message correlation.
//!
//! This crate owns the low-level plumbing between a caller and one
//! debuggable target:
//!
//! - **Transport**: one duplex WebSocket carrying JSON text frames
//! - **Connection**: request/response correlation over that transport,
//!   with per-request deadlines and cancellation cleanup
//! - **Error**: the error taxonomy shared by every uidriver crate
//!
//! # Message flow
//!
//! 1. A caller invokes [`Connection::send_message`] with a method and params
//! 2. The connection allocates a fresh correlation id and a oneshot channel
//! 3. The request is queued to the writer task and sent as one text frame
//! 4. The caller suspends on the oneshot receiver (bounded by a deadline)
//! 5. The dispatch loop receives the correlated response and resolves it
//!
//! Responses may arrive in any order; correctness depends only on the
//! correlation id, never on arrival order.

pub mod connection;
pub mod error;
pub mod transport;

pub use connection::{Connection, ErrorPayload, Event, Message, Request, Response};
pub use error::{Error, Result};
pub use transport::{
    Transport, TransportParts, TransportReceiver, WebSocketTransport, WebSocketTransportReceiver,
    WebSocketTransportSender,
};
