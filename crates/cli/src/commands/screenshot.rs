use base64::Engine;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};
use uidriver_protocol::{ScreenshotFormat, ScreenshotOptions};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScreenshotData {
    format: String,
    /// Encoded payload, present when no output file was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes_written: Option<usize>,
}

pub async fn execute(
    ctx: &CommandContext,
    format: ScreenshotFormat,
    quality: Option<u8>,
    output: Option<&Path>,
) -> Result<()> {
    let (session, target_id) = ctx.session().await?;
    info!(target = "uidriver", %target_id, %format, "capturing screenshot");

    let mut options = ScreenshotOptions::new(format);
    if let Some(quality) = quality {
        options = options.with_quality(quality);
    }

    let payload = session.screenshot(options).await?;

    let data = match output {
        Some(path) => {
            let bytes_written = write_payload(path, &payload)?;
            info!(target = "uidriver", path = %path.display(), bytes_written, "screenshot saved");
            ScreenshotData {
                format: format.to_string(),
                data: None,
                path: Some(path.to_path_buf()),
                bytes_written: Some(bytes_written),
            }
        }
        None => ScreenshotData {
            format: format.to_string(),
            data: Some(payload),
            path: None,
            bytes_written: None,
        },
    };

    print_result(
        &ResultBuilder::new("screenshot").data(data).build(),
        ctx.format,
    );
    Ok(())
}

/// Decodes the transport encoding and writes the raw image to disk. The
/// image itself stays opaque; only the base64 wrapper is undone.
fn write_payload(path: &Path, payload: &str) -> Result<usize> {
    let bytes = base64::prelude::BASE64_STANDARD
        .decode(payload)
        .map_err(|err| {
            uidriver::Error::Protocol(format!("screenshot payload is not valid base64: {err}"))
        })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, &bytes)?;
    Ok(bytes.len())
}
