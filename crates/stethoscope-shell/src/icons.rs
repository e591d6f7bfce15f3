//! Status icon assets decoded for the tray.

use stethoscope_shell_core::{CoreResult, ScanStatus, ShellError, StatusIconRegistry};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, instrument};
use tray_icon::Icon;

/// Decoded RGBA pixels of one PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RgbaImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode PNG (or any format `image` reads) bytes into RGBA.
pub(crate) fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RgbaImage {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}

/// Load the three status icons from `icon_dir`.
///
/// Fails on the first missing or undecodable asset.
#[instrument]
pub(crate) fn load_status_icons(icon_dir: &Path) -> CoreResult<StatusIconRegistry<Icon>> {
    StatusIconRegistry::load(|status| load_icon(icon_dir, status))
}

#[track_caller]
fn load_icon(icon_dir: &Path, status: ScanStatus) -> CoreResult<Icon> {
    let location = Location::caller();
    let missing = |reason: String| ShellError::IconMissing {
        status,
        reason,
        location: ErrorLocation::from(location),
    };

    let path = icon_dir.join(status.icon_file_name());
    let bytes = std::fs::read(&path)
        .map_err(|e| missing(format!("Failed to read {}: {}", path.display(), e)))?;
    let image = decode_rgba(&bytes)
        .map_err(|e| missing(format!("Failed to decode {}: {}", path.display(), e)))?;

    debug!(status = %status, path = ?path, "Status icon loaded");

    Icon::from_rgba(image.rgba, image.width, image.height)
        .map_err(|e| missing(format!("Failed to create icon from RGBA: {}", e)))
}
