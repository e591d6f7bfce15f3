/// Where the application is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Process started, `Ready` not yet handled.
    Starting,
    /// Startup sequence running.
    Ready,
    /// A main window exists.
    Active,
    /// Resident with no window (tray and dock only).
    Backgrounded,
    /// Shutting down; only quit and crash events are handled.
    Quitting,
}

/// What the event loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running.
    Continue,
    /// Exit normally. Before-quit cleanup has already run.
    Quit,
    /// Exit with this status. Cleanup has already run.
    Exit(i32),
}
