//! OS input and screen-capture interfaces, gated by capability grants.
//!
//! The platform drivers themselves live in the embedding application;
//! this module fixes the operation set, the capability vocabulary, and
//! the permission gate so that every caller sees the same contract. A
//! missing grant always surfaces as [`Error::Capability`] naming the
//! capability and how to grant it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uidriver_runtime::{Error, Result};

/// The closed set of OS capabilities the bridge can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Accessibility,
    ScreenCapture,
    InputMonitoring,
    Camera,
    Microphone,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Accessibility => "accessibility",
            Capability::ScreenCapture => "screen-capture",
            Capability::InputMonitoring => "input-monitoring",
            Capability::Camera => "camera",
            Capability::Microphone => "microphone",
        }
    }

    /// Operator-facing instructions for granting the capability.
    pub fn remediation(&self) -> &'static str {
        match self {
            Capability::Accessibility => {
                "Grant it under System Settings > Privacy & Security > Accessibility, \
                 then restart the process."
            }
            Capability::ScreenCapture => {
                "Grant it under System Settings > Privacy & Security > Screen Recording, \
                 then restart the process."
            }
            Capability::InputMonitoring => {
                "Grant it under System Settings > Privacy & Security > Input Monitoring, \
                 then restart the process."
            }
            Capability::Camera => {
                "Grant it under System Settings > Privacy & Security > Camera."
            }
            Capability::Microphone => {
                "Grant it under System Settings > Privacy & Security > Microphone."
            }
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grant state reported by the OS for one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionStatus {
    NotDetermined,
    Denied,
    Authorized,
    Restricted,
}

/// Query/request surface over OS capability grants.
///
/// `request` is a no-op returning the current status when the grant has
/// already been decided one way or the other.
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    async fn status(&self, capability: Capability) -> PermissionStatus;
    async fn request(&self, capability: Capability) -> PermissionStatus;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyModifier {
    Shift,
    Control,
    Alt,
    Meta,
}

/// Rectangular region of the physical screen, in screen points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

/// Pointer/keyboard/screen operations against the physical machine.
///
/// Operations are serialized by the OS input queue; implementations do
/// not need their own locking, and callers must not interleave pointer
/// and keyboard calls within one logical automation step.
#[async_trait]
pub trait DeviceBridge: Send + Sync {
    async fn move_mouse(&self, x: f64, y: f64) -> Result<()>;

    /// Clicks at the given point, or at the current pointer position
    /// when no point is given.
    async fn click(&self, at: Option<(f64, f64)>, button: MouseButton) -> Result<()>;

    async fn double_click(&self, at: Option<(f64, f64)>) -> Result<()>;

    async fn drag(&self, from: (f64, f64), to: (f64, f64)) -> Result<()>;

    async fn type_text(&self, text: &str) -> Result<()>;

    async fn press_key(&self, key: &str, modifiers: &[KeyModifier]) -> Result<()>;

    /// Captures the physical screen (or a region of it) and returns the
    /// encoded payload as-is.
    async fn screenshot(&self, region: Option<Region>) -> Result<String>;

    async fn screen_size(&self) -> Result<ScreenSize>;
}

/// A [`DeviceBridge`] that checks capability grants before delegating.
///
/// Pointer and keyboard synthesis require `accessibility`; capture
/// operations require `screen-capture`. An undetermined grant triggers
/// exactly one request before the operation is refused or allowed.
pub struct GatedBridge<B, O> {
    bridge: B,
    oracle: O,
}

impl<B: DeviceBridge, O: PermissionOracle> GatedBridge<B, O> {
    pub fn new(bridge: B, oracle: O) -> Self {
        Self { bridge, oracle }
    }

    async fn ensure(&self, capability: Capability) -> Result<()> {
        let mut status = self.oracle.status(capability).await;
        if status == PermissionStatus::NotDetermined {
            status = self.oracle.request(capability).await;
        }
        if status == PermissionStatus::Authorized {
            return Ok(());
        }
        tracing::debug!(%capability, ?status, "capability not granted");
        Err(Error::Capability {
            capability: capability.to_string(),
            remediation: capability.remediation().to_string(),
        })
    }
}

#[async_trait]
impl<B: DeviceBridge, O: PermissionOracle> DeviceBridge for GatedBridge<B, O> {
    async fn move_mouse(&self, x: f64, y: f64) -> Result<()> {
        self.ensure(Capability::Accessibility).await?;
        self.bridge.move_mouse(x, y).await
    }

    async fn click(&self, at: Option<(f64, f64)>, button: MouseButton) -> Result<()> {
        self.ensure(Capability::Accessibility).await?;
        self.bridge.click(at, button).await
    }

    async fn double_click(&self, at: Option<(f64, f64)>) -> Result<()> {
        self.ensure(Capability::Accessibility).await?;
        self.bridge.double_click(at).await
    }

    async fn drag(&self, from: (f64, f64), to: (f64, f64)) -> Result<()> {
        self.ensure(Capability::Accessibility).await?;
        self.bridge.drag(from, to).await
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.ensure(Capability::Accessibility).await?;
        self.bridge.type_text(text).await
    }

    async fn press_key(&self, key: &str, modifiers: &[KeyModifier]) -> Result<()> {
        self.ensure(Capability::Accessibility).await?;
        self.bridge.press_key(key, modifiers).await
    }

    async fn screenshot(&self, region: Option<Region>) -> Result<String> {
        self.ensure(Capability::ScreenCapture).await?;
        self.bridge.screenshot(region).await
    }

    async fn screen_size(&self) -> Result<ScreenSize> {
        self.ensure(Capability::ScreenCapture).await?;
        self.bridge.screen_size().await
    }
}
