//! Pre-loaded tray icons keyed by scan status.

use crate::{CoreResult, ScanStatus};

use tracing::{debug, instrument};

/// Maps every [`ScanStatus`] to a loaded icon.
///
/// All icons are loaded at construction, so a missing asset is a startup
/// failure rather than something discovered the first time a scan fails.
#[derive(Debug, Clone)]
pub struct StatusIconRegistry<I> {
    pass: I,
    nudge: I,
    fail: I,
}

impl<I> StatusIconRegistry<I> {
    /// Load one icon per status through `loader`.
    ///
    /// # Errors
    ///
    /// Returns the first loader error, typically [`crate::ShellError::IconMissing`].
    #[instrument(skip(loader))]
    pub fn load<F>(mut loader: F) -> CoreResult<Self>
    where
        F: FnMut(ScanStatus) -> CoreResult<I>,
    {
        let mut load_one = |status: ScanStatus| {
            let icon = loader(status)?;
            debug!(status = %status, file = status.icon_file_name(), "Status icon loaded");
            Ok::<I, crate::ShellError>(icon)
        };

        Ok(Self {
            pass: load_one(ScanStatus::Pass)?,
            nudge: load_one(ScanStatus::Nudge)?,
            fail: load_one(ScanStatus::Fail)?,
        })
    }

    /// Icon for `status`.
    pub fn icon(&self, status: ScanStatus) -> &I {
        match status {
            ScanStatus::Pass => &self.pass,
            ScanStatus::Nudge => &self.nudge,
            ScanStatus::Fail => &self.fail,
        }
    }
}
