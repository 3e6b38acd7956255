//! Defaults and per-operation options.

use serde::{Deserialize, Serialize};

/// Default discovery host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default discovery port.
pub const DEFAULT_PORT: u16 = 9222;

/// Environment variable overriding the discovery host.
pub const HOST_ENV_VAR: &str = "UIDRIVER_HOST";

/// Environment variable overriding the discovery port.
pub const PORT_ENV_VAR: &str = "UIDRIVER_PORT";

/// Default deadline for a single protocol request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Screenshot encodings the protocol accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ScreenshotFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenshotFormat::Png => "png",
            ScreenshotFormat::Jpeg => "jpeg",
            ScreenshotFormat::Webp => "webp",
        }
    }

    /// Whether the encoder takes a quality parameter. Only lossy formats do.
    pub fn supports_quality(&self) -> bool {
        matches!(self, ScreenshotFormat::Jpeg | ScreenshotFormat::Webp)
    }
}

impl std::fmt::Display for ScreenshotFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScreenshotFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ScreenshotFormat::Png),
            "jpeg" | "jpg" => Ok(ScreenshotFormat::Jpeg),
            "webp" => Ok(ScreenshotFormat::Webp),
            other => Err(format!("unknown screenshot format: {other}")),
        }
    }
}

/// Options for a screenshot capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenshotOptions {
    pub format: ScreenshotFormat,
    /// Compression quality 0-100. Valid only when the format is lossy.
    pub quality: Option<u8>,
}

impl ScreenshotOptions {
    pub fn new(format: ScreenshotFormat) -> Self {
        Self {
            format,
            quality: None,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }
}
