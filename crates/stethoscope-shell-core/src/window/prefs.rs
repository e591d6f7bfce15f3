use std::env;

use tracing::debug;

/// Environment variable selecting the build mode.
pub const BUILD_MODE_ENV: &str = "STETHOSCOPE_ENV";

/// Main window width, fixed in both sizes.
pub const WINDOW_WIDTH: u32 = 480;
/// Main window height at rest.
pub const WINDOW_HEIGHT: u32 = 670;
/// Main window height while a download is in progress.
pub const DOWNLOAD_WINDOW_HEIGHT: u32 = 110;

/// How the application was built and packaged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Local development run.
    Development,
    /// Packaged release.
    #[default]
    Production,
}

impl BuildMode {
    /// Parse a mode name; unknown names fall back to production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => BuildMode::Development,
            _ => BuildMode::Production,
        }
    }

    /// Read the mode from [`BUILD_MODE_ENV`].
    pub fn from_env() -> Self {
        let mode = env::var(BUILD_MODE_ENV)
            .map(|value| Self::parse(&value))
            .unwrap_or_default();
        debug!(mode = ?mode, "Build mode resolved");
        mode
    }

    /// Name used in logs and by the background server.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }
}

/// Main window configuration, computed once per window creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPreferences {
    /// Window width in logical pixels.
    pub width: u32,
    /// Resting height in logical pixels.
    pub height: u32,
    /// Height while a download is in progress.
    pub download_height: u32,
    /// Whether the user may resize the window.
    pub resizable: bool,
    /// Always false; the shell has a fixed layout.
    pub fullscreenable: bool,
    /// Always false; the shell has a fixed layout.
    pub maximizable: bool,
    /// Open the developer inspection panel after loading.
    pub open_devtools: bool,
}

impl WindowPreferences {
    /// Preferences for `mode`, with the debugger flag `debug`.
    ///
    /// Resizing is only locked for production builds run without the debugger.
    pub fn new(mode: BuildMode, debug: bool) -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            download_height: DOWNLOAD_WINDOW_HEIGHT,
            resizable: !(mode == BuildMode::Production && !debug),
            fullscreenable: false,
            maximizable: false,
            open_devtools: debug,
        }
    }
}
