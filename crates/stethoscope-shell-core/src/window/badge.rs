use crate::{CoreResult, ShellError};

use std::panic::Location;

use base64::{Engine, engine::general_purpose::STANDARD};
use error_location::ErrorLocation;

/// Overlay description shown when a scan starts.
pub const NO_VIOLATIONS_DESCRIPTION: &str = "No policy violations";

/// Accessible overlay description for `count` violations.
pub fn violations_description(count: u32) -> String {
    format!("{count} policy violations")
}

/// Decode the bytes of a base64 `data:` URL as rendered by the UI.
#[track_caller]
pub fn decode_data_url(data_url: &str) -> CoreResult<Vec<u8>> {
    let location = Location::caller();
    let invalid = |reason: String| ShellError::InvalidBadgeImage {
        reason,
        location: ErrorLocation::from(location),
    };

    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| invalid("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing payload separator".to_string()))?;

    if !header.ends_with(";base64") {
        return Err(invalid(format!("unsupported encoding in {header:?}")));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(format!("bad base64 payload: {e}")))
}
