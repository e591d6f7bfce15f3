use crate::ScanStatus;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Shell lifecycle errors with source location tracking.
#[derive(Error, Debug)]
pub enum ShellError {
    /// A status icon asset could not be loaded at startup.
    #[error("Icon for {status} is missing: {reason} {location}")]
    IconMissing {
        /// Scan status whose icon failed to load.
        status: ScanStatus,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The single-instance lock could not be acquired or contacted.
    #[error("Instance lock error: {reason} {location}")]
    InstanceLock {
        /// Description of the lock failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Main window operation failed.
    #[error("Window error: {reason} {location}")]
    Window {
        /// Description of the window failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Tray icon operation failed.
    #[error("Tray error: {reason} {location}")]
    Tray {
        /// Description of the tray failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Badge image data could not be decoded.
    #[error("Invalid badge image: {reason} {location}")]
    InvalidBadgeImage {
        /// Description of the decoding failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A renderer IPC message was malformed or used an unknown channel.
    #[error("Invalid IPC message: {reason} {location}")]
    InvalidIpcMessage {
        /// Description of the problem.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A scan status string did not name a known status.
    #[error("Unknown scan status: {value:?} {location}")]
    InvalidScanStatus {
        /// The rejected value.
        value: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The content source could not be turned into a loadable URL.
    #[error("Invalid content source: {reason} {location}")]
    InvalidContentSource {
        /// Description of the problem.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The update service failed to complete a check.
    #[error("Update check failed: {reason} {location}")]
    UpdateCheckFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The background server could not be started.
    #[error("Server start failed: {reason} {location}")]
    ServerStartFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from sockets or the filesystem.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for ShellError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        ShellError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`ShellError`].
pub type Result<T> = std::result::Result<T, ShellError>;
