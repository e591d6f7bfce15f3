//! Renderer IPC channel surface.
//!
//! Messages are fire-and-forget. On the wire each one is a JSON object
//! `{"channel": "...", "args": [...]}`.

use crate::{CoreResult, ShellError};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::Deserialize;
use serde_json::Value;

/// A message from the renderer, decoded by channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcMessage {
    /// `download:start`: shrink the window while an update downloads.
    DownloadStart,
    /// `scan:init`: a scan started, so reset the badge and overlay.
    ScanInit,
    /// `scan:violation`: a scan found violations.
    ScanViolation {
        /// Badge image rendered by the UI, as a `data:` URL.
        badge_data_url: String,
        /// Number of violations to show.
        violation_count: u32,
    },
    /// `download:complete`: an update download finished.
    DownloadComplete {
        /// Restore the resting window size.
        resize: bool,
    },
    /// `app:loaded`: the UI finished loading.
    AppLoaded,
}

#[derive(Deserialize)]
struct RawMessage {
    channel: String,
    #[serde(default)]
    args: Vec<Value>,
}

#[derive(Deserialize)]
struct DownloadCompleteArgs {
    #[serde(default)]
    resize: bool,
}

impl IpcMessage {
    /// Channel name of this message.
    pub fn channel(&self) -> &'static str {
        match self {
            IpcMessage::DownloadStart => "download:start",
            IpcMessage::ScanInit => "scan:init",
            IpcMessage::ScanViolation { .. } => "scan:violation",
            IpcMessage::DownloadComplete { .. } => "download:complete",
            IpcMessage::AppLoaded => "app:loaded",
        }
    }

    /// Decode a JSON wire message.
    #[track_caller]
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let raw: RawMessage =
            serde_json::from_str(text).map_err(|e| ShellError::InvalidIpcMessage {
                reason: format!("Failed to parse message: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        Self::from_parts(&raw.channel, &raw.args)
    }

    /// Decode a message from its channel name and positional arguments.
    #[track_caller]
    pub fn from_parts(channel: &str, args: &[Value]) -> CoreResult<Self> {
        let location = Location::caller();
        let invalid = |reason: String| ShellError::InvalidIpcMessage {
            reason,
            location: ErrorLocation::from(location),
        };

        match channel {
            "download:start" => Ok(IpcMessage::DownloadStart),
            "scan:init" => Ok(IpcMessage::ScanInit),
            "app:loaded" => Ok(IpcMessage::AppLoaded),
            "scan:violation" => {
                let badge_data_url = args
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("scan:violation needs a badge data URL".to_string()))?
                    .to_string();
                let violation_count = args
                    .get(1)
                    .and_then(Value::as_u64)
                    .and_then(|count| u32::try_from(count).ok())
                    .ok_or_else(|| {
                        invalid("scan:violation needs a non-negative violation count".to_string())
                    })?;
                Ok(IpcMessage::ScanViolation {
                    badge_data_url,
                    violation_count,
                })
            }
            "download:complete" => {
                let resize = match args.first() {
                    Some(value) => {
                        serde_json::from_value::<DownloadCompleteArgs>(value.clone())
                            .map_err(|e| invalid(format!("bad download:complete payload: {e}")))?
                            .resize
                    }
                    None => false,
                };
                Ok(IpcMessage::DownloadComplete { resize })
            }
            other => Err(invalid(format!("unknown channel {other:?}"))),
        }
    }
}
