//! [`Desktop`] implementation over tao windows, wry webviews and the
//! system tray.
//!
//! tao only hands out its window target inside the event loop callback, so
//! a [`TaoDesktop`] is built per event around long-lived [`DesktopState`].

pub(crate) mod webview;
mod window;

pub use window::TaoWindow;

use crate::{TrayManager, icons};

use stethoscope_shell_core::{
    BuildMode, CoreResult, Desktop, EventSink, Platform, RequestHeadersHook, ShellError,
    ShellEvent, WindowPreferences,
};

use std::{
    cell::RefCell,
    panic::Location,
    rc::Rc,
    sync::Arc,
};

use error_location::ErrorLocation;
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use tao::{
    dpi::LogicalSize,
    event_loop::EventLoopWindowTarget,
    window::{Icon, Window, WindowBuilder},
};
use tracing::{debug, info, instrument};

/// Title of the main window and of shell notifications.
pub(crate) const APP_NAME: &str = "Stethoscope";

/// Header hook shared between the desktop and every window it creates.
pub(crate) type SharedHeadersHook = Rc<RefCell<Option<RequestHeadersHook>>>;

/// Desktop state that outlives a single event loop callback.
pub(crate) struct DesktopState {
    platform: Platform,
    headers_hook: SharedHeadersHook,
    sink: Arc<dyn EventSink>,
    #[cfg(target_os = "macos")]
    main_window: std::rc::Weak<Window>,
    #[cfg(target_os = "macos")]
    app_menu: Option<tray_icon::menu::Menu>,
}

impl DesktopState {
    /// State for `platform`; renderer IPC is posted to `sink`.
    pub(crate) fn new(platform: Platform, sink: Arc<dyn EventSink>) -> Self {
        Self {
            platform,
            headers_hook: Rc::new(RefCell::new(None)),
            sink,
            #[cfg(target_os = "macos")]
            main_window: std::rc::Weak::new(),
            #[cfg(target_os = "macos")]
            app_menu: None,
        }
    }
}

/// The desktop as seen from one event loop callback.
pub(crate) struct TaoDesktop<'a> {
    target: &'a EventLoopWindowTarget<ShellEvent>,
    state: &'a mut DesktopState,
}

impl<'a> TaoDesktop<'a> {
    pub(crate) fn new(
        target: &'a EventLoopWindowTarget<ShellEvent>,
        state: &'a mut DesktopState,
    ) -> Self {
        Self { target, state }
    }
}

impl Desktop for TaoDesktop<'_> {
    type Window = TaoWindow;
    type Tray = TrayManager;

    fn platform(&self) -> Platform {
        self.state.platform
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn create_window(&mut self, prefs: &WindowPreferences) -> CoreResult<TaoWindow> {
        let window = WindowBuilder::new()
            .with_title(APP_NAME)
            .with_inner_size(LogicalSize::new(prefs.width, prefs.height))
            .with_resizable(prefs.resizable)
            .with_maximizable(prefs.maximizable)
            .build(self.target)
            .map_err(|e| ShellError::Window {
                reason: format!("Failed to create main window: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let window = Rc::new(window);
        #[cfg(target_os = "macos")]
        {
            self.state.main_window = Rc::downgrade(&window);
        }

        Ok(TaoWindow::new(
            window,
            prefs.open_devtools,
            Rc::clone(&self.state.headers_hook),
            Arc::clone(&self.state.sink),
        ))
    }

    #[cfg(target_os = "macos")]
    #[track_caller]
    fn attach_menu(&mut self, _window: &mut TaoWindow, mode: BuildMode) -> CoreResult<()> {
        let menu = app_menu::build()?;
        menu.init_for_nsapp();
        self.state.app_menu = Some(menu);
        debug!(mode = mode.as_str(), "Application menu attached");
        Ok(())
    }

    #[cfg(not(target_os = "macos"))]
    fn attach_menu(&mut self, _window: &mut TaoWindow, mode: BuildMode) -> CoreResult<()> {
        debug!(mode = mode.as_str(), "No global menu bar, menu entries live in the tray");
        Ok(())
    }

    fn create_tray(&mut self, image: &tray_icon::Icon) -> CoreResult<TrayManager> {
        TrayManager::new(image)
    }

    fn set_badge_count(&mut self, count: u32) {
        #[cfg(target_os = "macos")]
        {
            use tao::platform::macos::WindowExtMacOS;
            if let Some(window) = self.state.main_window.upgrade() {
                let label = (count > 0).then(|| count.to_string());
                window.set_badge_label(label);
            }
        }

        debug!(count, "Badge count updated");
    }

    #[track_caller]
    fn decode_overlay(&self, png: &[u8]) -> CoreResult<Icon> {
        let location = Location::caller();
        let invalid = |reason: String| ShellError::InvalidBadgeImage {
            reason,
            location: ErrorLocation::from(location),
        };

        let image = icons::decode_rgba(png)
            .map_err(|e| invalid(format!("Failed to decode badge image: {}", e)))?;
        Icon::from_rgba(image.rgba, image.width, image.height)
            .map_err(|e| invalid(format!("Failed to create overlay icon: {}", e)))
    }

    fn register_protocol(&mut self, scheme: &str) -> CoreResult<()> {
        // Scheme ownership is declared by the installer on every platform.
        info!(scheme, "Deep-link protocol handled by this executable");
        Ok(())
    }

    fn install_request_headers_hook(&mut self, hook: RequestHeadersHook) {
        *self.state.headers_hook.borrow_mut() = Some(hook);
        debug!("Request header hook installed");
    }

    /// Blocks until the user dismisses the dialog.
    fn show_notice(&mut self, message: &str) {
        info!(message, "Showing notice");
        let _ = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(APP_NAME)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

#[cfg(target_os = "macos")]
mod app_menu {
    use crate::tray_manager::{MENU_CHECK_FOR_UPDATES, MENU_QUIT};

    use stethoscope_shell_core::{CoreResult, ShellError};

    use std::panic::Location;

    use error_location::ErrorLocation;
    use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem, Submenu};

    #[track_caller]
    pub(super) fn build() -> CoreResult<Menu> {
        let location = Location::caller();
        let menu_error = |reason: String| ShellError::Window {
            reason,
            location: ErrorLocation::from(location),
        };

        let update_item = MenuItem::with_id(MENU_CHECK_FOR_UPDATES, "Check for Updates", true, None);
        let quit_item = MenuItem::with_id(MENU_QUIT, "Quit Stethoscope", true, None);

        let app_submenu = Submenu::with_items(
            super::APP_NAME,
            true,
            &[
                &PredefinedMenuItem::about(None, None),
                &update_item,
                &PredefinedMenuItem::separator(),
                &PredefinedMenuItem::hide(None),
                &PredefinedMenuItem::separator(),
                &quit_item,
            ],
        )
        .map_err(|e| menu_error(format!("Failed to build application menu: {}", e)))?;

        let edit_submenu = Submenu::with_items(
            "Edit",
            true,
            &[
                &PredefinedMenuItem::copy(None),
                &PredefinedMenuItem::paste(None),
                &PredefinedMenuItem::select_all(None),
            ],
        )
        .map_err(|e| menu_error(format!("Failed to build edit menu: {}", e)))?;

        Menu::with_items(&[&app_submenu, &edit_submenu])
            .map_err(|e| menu_error(format!("Failed to build menu bar: {}", e)))
    }
}
