use crate::{
    DeepLinkIntent, DeepLinkSlot, LifecycleState, ScanStatus, ServerSlot, ShellWindow, StatusTray,
};

use std::time::{Duration, Instant};

use tracing::debug;

/// Process-wide shell state.
///
/// Owned by the controller and mutated only from the event loop thread.
/// Holds at most one live main window and one live tray; both are
/// destroyed before being replaced.
#[derive(Debug)]
pub struct ApplicationSession<W, T> {
    pub(crate) main_window: Option<W>,
    pub(crate) tray: Option<T>,
    pub(crate) pending_deep_link: DeepLinkSlot,
    pub(crate) is_first_launch: bool,
    pub(crate) server: ServerSlot,
    pub(crate) badge_count: u32,
    pub(crate) tray_status: ScanStatus,
    pub(crate) started_at: Instant,
    pub(crate) state: LifecycleState,
}

impl<W: ShellWindow, T: StatusTray> ApplicationSession<W, T> {
    /// Fresh session sharing `server` with the crash path.
    pub fn new(server: ServerSlot) -> Self {
        Self {
            main_window: None,
            tray: None,
            pending_deep_link: DeepLinkSlot::default(),
            is_first_launch: true,
            server,
            badge_count: 0,
            tray_status: ScanStatus::default(),
            started_at: Instant::now(),
            state: LifecycleState::Starting,
        }
    }

    /// Destroy the current window, if any, before a new one is created.
    pub(crate) fn release_window(&mut self) {
        if let Some(mut window) = self.main_window.take() {
            debug!("Destroying previous main window");
            window.destroy();
        }
    }

    /// Destroy the current tray, if any, before a new one is created.
    pub(crate) fn release_tray(&mut self) {
        if let Some(mut tray) = self.tray.take() {
            debug!("Destroying previous tray icon");
            tray.destroy();
        }
    }

    /// The main window, if it exists and has not been torn down.
    pub(crate) fn live_window_mut(&mut self) -> Option<&mut W> {
        self.main_window
            .as_mut()
            .filter(|window| !window.is_destroyed())
    }

    /// A usable main window exists.
    pub fn has_live_window(&self) -> bool {
        self.main_window
            .as_ref()
            .is_some_and(|window| !window.is_destroyed())
    }

    /// The main window handle.
    pub fn main_window(&self) -> Option<&W> {
        self.main_window.as_ref()
    }

    /// The tray handle.
    pub fn tray(&self) -> Option<&T> {
        self.tray.as_ref()
    }

    /// Intent waiting for the UI to finish loading.
    pub fn pending_deep_link(&self) -> DeepLinkIntent {
        self.pending_deep_link.peek()
    }

    /// No update check has run yet.
    pub fn is_first_launch(&self) -> bool {
        self.is_first_launch
    }

    /// The background server is accepting connections.
    pub fn server_listening(&self) -> bool {
        self.server.is_listening()
    }

    /// Violation count last shown on the badge.
    pub fn badge_count(&self) -> u32 {
        self.badge_count
    }

    /// Status currently shown in the tray.
    pub fn tray_status(&self) -> ScanStatus {
        self.tray_status
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Time since the session was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
