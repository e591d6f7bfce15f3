//! System tray icon showing the latest scan status.
//!
//! The tray carries a context menu for Open, Check for Updates and Quit.
//! Menu entries use fixed ids so a rebuilt tray keeps the same mapping.

use stethoscope_shell_core::{CoreResult, ShellError, StatusTray, TrayAction};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

pub(crate) const TRAY_TOOLTIP: &str = "Stethoscope";

pub(crate) const MENU_OPEN: &str = "open";
pub(crate) const MENU_CHECK_FOR_UPDATES: &str = "check-for-updates";
pub(crate) const MENU_QUIT: &str = "quit";

/// Map a menu item id to the action it stands for.
pub(crate) fn tray_action(menu_id: &str) -> Option<TrayAction> {
    match menu_id {
        MENU_OPEN => Some(TrayAction::Open),
        MENU_CHECK_FOR_UPDATES => Some(TrayAction::CheckForUpdates),
        MENU_QUIT => Some(TrayAction::Quit),
        _ => None,
    }
}

/// Tray menu with the shell's entries.
#[track_caller]
pub(crate) fn build_menu() -> CoreResult<Menu> {
    let location = Location::caller();
    let tray_error = |reason: String| ShellError::Tray {
        reason,
        location: ErrorLocation::from(location),
    };

    let menu = Menu::new();
    let open_item = MenuItem::with_id(MENU_OPEN, "Open Stethoscope", true, None);
    let update_item = MenuItem::with_id(MENU_CHECK_FOR_UPDATES, "Check for Updates", true, None);
    let quit_item = MenuItem::with_id(MENU_QUIT, "Quit", true, None);

    menu.append(&open_item)
        .map_err(|e| tray_error(format!("Failed to add open menu: {}", e)))?;
    menu.append(&update_item)
        .map_err(|e| tray_error(format!("Failed to add update menu: {}", e)))?;
    menu.append(&PredefinedMenuItem::separator())
        .map_err(|e| tray_error(format!("Failed to add separator: {}", e)))?;
    menu.append(&quit_item)
        .map_err(|e| tray_error(format!("Failed to add quit menu: {}", e)))?;

    Ok(menu)
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: Option<TrayIcon>,
}

impl TrayManager {
    /// Create the tray showing `icon`.
    #[track_caller]
    #[instrument(skip(icon))]
    pub fn new(icon: &Icon) -> CoreResult<Self> {
        let menu = build_menu()?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(TRAY_TOOLTIP)
            .with_menu(Box::new(menu))
            .with_menu_on_left_click(false)
            .with_icon(icon.clone())
            .build()
            .map_err(|e| ShellError::Tray {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon: Some(tray_icon),
        })
    }
}

impl StatusTray for TrayManager {
    type Image = Icon;

    #[track_caller]
    fn set_image(&mut self, image: &Icon) -> CoreResult<()> {
        let Some(tray_icon) = self.tray_icon.as_ref() else {
            debug!("Tray already destroyed, ignoring icon update");
            return Ok(());
        };

        tray_icon
            .set_icon(Some(image.clone()))
            .map_err(|e| ShellError::Tray {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn destroy(&mut self) {
        if self.tray_icon.take().is_some() {
            debug!("System tray icon removed");
        }
    }
}
