//! Seams between the lifecycle logic and the OS window system.
//!
//! The controller only ever talks to windows, trays and the dock through
//! these traits. The binary implements them with `tao` and `tray-icon`;
//! tests implement them with recording fakes.

use crate::{BuildMode, CoreResult, RequestHeadersHook, WindowPreferences};

use url::Url;

/// Host operating system family, as far as activation semantics go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// macOS: dock badge, persistent dock presence, `open-url` deep links.
    MacOs,
    /// Windows: overlay icons, deep links on the command line.
    Windows,
    /// Linux desktops: overlay via window icon, deep links on the command line.
    Linux,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Native dock/taskbar badge counts.
    pub fn has_native_badge(&self) -> bool {
        matches!(self, Platform::MacOs)
    }

    /// The app stays resident with no windows open.
    pub fn has_persistent_dock(&self) -> bool {
        matches!(self, Platform::MacOs)
    }

    /// Deep links arrive as command-line arguments of a (second) launch.
    pub fn args_carry_deep_link(&self) -> bool {
        matches!(self, Platform::Windows | Platform::Linux)
    }
}

/// The main application window.
pub trait ShellWindow {
    /// Platform overlay icon type.
    type Overlay;

    /// The window was torn down by the OS or the user.
    fn is_destroyed(&self) -> bool;
    /// The window is minimized.
    fn is_minimized(&self) -> bool;
    /// Restore from minimized.
    fn restore(&mut self);
    /// Bring to the foreground.
    fn focus(&mut self);
    /// Resize, optionally animated where the platform supports it.
    fn set_size(&mut self, width: u32, height: u32, animate: bool);
    /// Set or clear the overlay icon together with its accessible description.
    fn set_overlay_icon(&mut self, icon: Option<&Self::Overlay>, description: &str);
    /// Load the UI from `url`.
    fn load_content(&mut self, url: &Url) -> CoreResult<()>;
    /// Open the developer inspection panel.
    fn open_devtools(&mut self);
    /// Release the native window.
    fn destroy(&mut self);
}

/// The status-bar tray icon.
pub trait StatusTray {
    /// Image type accepted by the tray.
    type Image;

    /// Swap the displayed image.
    fn set_image(&mut self, image: &Self::Image) -> CoreResult<()>;
    /// Remove the tray icon from the status bar.
    fn destroy(&mut self);
}

/// Factory and process-level affordances of the desktop environment.
pub trait Desktop {
    /// Window type created by this desktop.
    type Window: ShellWindow;
    /// Tray type created by this desktop.
    type Tray: StatusTray;

    /// Platform semantics to apply.
    fn platform(&self) -> Platform;

    /// Build a new, empty main window.
    fn create_window(&mut self, prefs: &WindowPreferences) -> CoreResult<Self::Window>;

    /// Attach the application menu to `window`.
    fn attach_menu(&mut self, window: &mut Self::Window, mode: BuildMode) -> CoreResult<()>;

    /// Create a tray icon showing `image`.
    fn create_tray(
        &mut self,
        image: &<Self::Tray as StatusTray>::Image,
    ) -> CoreResult<Self::Tray>;

    /// Set the dock/taskbar badge count; zero clears it.
    fn set_badge_count(&mut self, count: u32);

    /// Decode PNG bytes into an overlay icon.
    fn decode_overlay(
        &self,
        png: &[u8],
    ) -> CoreResult<<Self::Window as ShellWindow>::Overlay>;

    /// Register the app as handler for `scheme` deep links.
    fn register_protocol(&mut self, scheme: &str) -> CoreResult<()>;

    /// Install the hook applied to every outbound content request.
    fn install_request_headers_hook(&mut self, hook: RequestHeadersHook);

    /// Show a blocking notice to the user.
    fn show_notice(&mut self, message: &str);
}
