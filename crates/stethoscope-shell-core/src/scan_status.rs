use crate::ShellError;

use std::{fmt, panic::Location, str::FromStr};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Result of the most recent device scan, as reported by the background server.
///
/// Drives the tray icon only. The violation badge count is tracked separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanStatus {
    /// Every policy passed.
    #[default]
    Pass,
    /// Some recommendations are not met.
    Nudge,
    /// At least one required policy failed.
    Fail,
}

impl ScanStatus {
    /// All statuses, in registry load order.
    pub const ALL: [ScanStatus; 3] = [ScanStatus::Pass, ScanStatus::Nudge, ScanStatus::Fail];

    /// The wire name used by the background server.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pass => "PASS",
            ScanStatus::Nudge => "NUDGE",
            ScanStatus::Fail => "FAIL",
        }
    }

    /// File name of the menu bar icon for this status.
    pub fn icon_file_name(&self) -> &'static str {
        match self {
            ScanStatus::Pass => "scope-icon-ok2@2x.png",
            ScanStatus::Nudge => "scope-icon-nudge2@2x.png",
            ScanStatus::Fail => "scope-icon-warn2@2x.png",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanStatus {
    type Err = ShellError;

    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PASS" => Ok(ScanStatus::Pass),
            "NUDGE" => Ok(ScanStatus::Nudge),
            "FAIL" => Ok(ScanStatus::Fail),
            other => Err(ShellError::InvalidScanStatus {
                value: other.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
