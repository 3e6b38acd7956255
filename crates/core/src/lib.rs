//! uidriver: remote control for debuggable GUI application windows.
//!
//! The entry point is the [`SessionManager`]: it discovers nothing itself,
//! but owns every open [`Session`] keyed by target id and is the sole way
//! to open or close one. Discovery belongs to the [`TargetRegistry`], and
//! the "connect to whatever page target is there" convenience lives in
//! the [`AutoConnectPolicy`] so that no other component ever reconnects
//! behind a caller's back.
//!
//! ```ignore
//! let manager = SessionManager::new();
//! let registry = TargetRegistry::new("localhost", 9222);
//! let policy = AutoConnectPolicy::new(registry);
//!
//! let (session, target_id) = policy.ensure_connected(&manager).await?;
//! let title = session.evaluate("document.title").await?;
//! manager.disconnect_all().await;
//! ```
//!
//! OS input and screen capture are a separate responsibility: the
//! [`device`] module defines the capability-gated interfaces and the
//! permission gate, while the platform drivers themselves are provided by
//! the embedding application.

pub mod autoconnect;
pub mod device;
pub mod manager;
pub mod registry;
pub mod session;

pub use autoconnect::AutoConnectPolicy;
pub use device::{Capability, DeviceBridge, GatedBridge, PermissionOracle, PermissionStatus};
pub use manager::SessionManager;
pub use registry::TargetRegistry;
pub use session::{Session, SessionState};
pub use uidriver_protocol::{
    DocumentNode, RemoteValue, ScreenshotFormat, ScreenshotOptions, Target, TargetKind,
};
pub use uidriver_runtime::{Error, Result};
