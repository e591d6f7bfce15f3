mod orchestrator;

pub use orchestrator::{UpdateOrchestrator, UpdateReport};

use crate::CoreResult;

use std::{fmt, future::Future, pin::Pin};

/// Future returned by an [`UpdateService`] check.
pub type UpdateFuture = Pin<Box<dyn Future<Output = CoreResult<UpdateOutcome>> + Send>>;

/// The external updater.
pub trait UpdateService: Send + Sync {
    /// Start one check. The future does the network work.
    fn check(&self, kind: UpdateCheckKind) -> UpdateFuture;
}

/// Which flavor of check to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateCheckKind {
    /// Background check at first launch; only notifies when an update exists.
    CheckAndNotify,
    /// User- or link-initiated check that surfaces the result.
    Interactive,
}

/// What caused a check, for the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTrigger {
    /// Automatic check on first window creation.
    FirstLaunch,
    /// `update` deep link received before the window existed.
    LaunchDeepLink,
    /// `update` deep link consumed when the UI finished loading.
    AppLoaded,
    /// `update` deep link received while the window was open.
    OpenUrl,
    /// Second launch carrying an `update` deep link.
    SecondInstance,
    /// Background server hook.
    ServerRequest,
    /// Tray menu entry.
    TrayMenu,
}

impl fmt::Display for UpdateTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateTrigger::FirstLaunch => "first-launch",
            UpdateTrigger::LaunchDeepLink => "launch-deep-link",
            UpdateTrigger::AppLoaded => "app-loaded",
            UpdateTrigger::OpenUrl => "open-url",
            UpdateTrigger::SecondInstance => "second-instance",
            UpdateTrigger::ServerRequest => "server-request",
            UpdateTrigger::TrayMenu => "tray-menu",
        };
        f.write_str(name)
    }
}

/// Successful result of a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Running the latest version.
    UpToDate,
    /// A newer release exists.
    Available {
        /// Version of the newer release.
        version: String,
        /// Where to get it.
        url: String,
    },
    /// The check was not performed (e.g. development build).
    Skipped,
}
