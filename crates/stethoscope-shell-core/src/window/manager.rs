use crate::{
    ApplicationSession, BuildMode, CoreResult, Desktop, ScanStatus, ShellWindow, StatusIconRegistry,
    StatusTray, WindowPreferences,
    window::badge::{NO_VIOLATIONS_DESCRIPTION, decode_data_url, violations_description},
};

use tracing::{debug, info, instrument, warn};
use url::Url;

/// Creates and tends the main window and tray.
///
/// Every renderer-facing operation tolerates repeated delivery and a
/// missing window, and logs instead of failing.
pub struct WindowLifecycleManager<I> {
    prefs: WindowPreferences,
    mode: BuildMode,
    content_url: Url,
    icons: StatusIconRegistry<I>,
}

impl<I> WindowLifecycleManager<I> {
    /// Manager creating windows with `prefs` that load `content_url`.
    pub fn new(
        prefs: WindowPreferences,
        mode: BuildMode,
        content_url: Url,
        icons: StatusIconRegistry<I>,
    ) -> Self {
        Self {
            prefs,
            mode,
            content_url,
            icons,
        }
    }

    /// Preferences applied to every window this manager creates.
    pub fn preferences(&self) -> &WindowPreferences {
        &self.prefs
    }

    /// Build the main window, attach the menu and load the UI.
    ///
    /// Any previous window is destroyed first.
    #[instrument(skip_all)]
    pub fn create_main_window<D>(
        &self,
        session: &mut ApplicationSession<D::Window, D::Tray>,
        desktop: &mut D,
    ) -> CoreResult<()>
    where
        D: Desktop,
        D::Tray: StatusTray<Image = I>,
    {
        info!("starting stethoscope");
        session.release_window();

        let mut window = desktop.create_window(&self.prefs)?;
        desktop.attach_menu(&mut window, self.mode)?;
        window.load_content(&self.content_url)?;

        if self.prefs.open_devtools {
            window.open_devtools();
        }

        session.main_window = Some(window);
        info!(url = %self.content_url, resizable = self.prefs.resizable, "Main window created");
        Ok(())
    }

    /// Replace the tray with a fresh one showing the PASS icon.
    #[instrument(skip_all)]
    pub fn create_tray<D>(
        &self,
        session: &mut ApplicationSession<D::Window, D::Tray>,
        desktop: &mut D,
    ) -> CoreResult<()>
    where
        D: Desktop,
        D::Tray: StatusTray<Image = I>,
    {
        session.release_tray();

        let tray = desktop.create_tray(self.icons.icon(ScanStatus::Pass))?;
        session.tray = Some(tray);
        session.tray_status = ScanStatus::Pass;
        info!("Tray icon created");
        Ok(())
    }

    /// Restore and focus the live window. Returns false if there is none.
    pub fn focus_main_window<W: ShellWindow, T>(&self, session: &mut ApplicationSession<W, T>) -> bool
    where
        T: StatusTray,
    {
        match session.live_window_mut() {
            Some(window) => {
                if window.is_minimized() {
                    window.restore();
                }
                window.focus();
                true
            }
            None => false,
        }
    }

    /// Tray click: focus the window, or rebuild it if it is gone.
    #[instrument(skip_all)]
    pub fn on_tray_clicked<D>(
        &self,
        session: &mut ApplicationSession<D::Window, D::Tray>,
        desktop: &mut D,
    ) where
        D: Desktop,
        D::Tray: StatusTray<Image = I>,
    {
        if self.focus_main_window(session) {
            return;
        }

        info!("Main window missing, recreating from tray");
        if let Err(e) = self.create_main_window(session, desktop) {
            warn!(error = %e, "Failed to recreate main window");
        }
    }

    /// The user closed the window; forget it.
    pub fn on_main_window_closed<W: ShellWindow, T: StatusTray>(
        &self,
        session: &mut ApplicationSession<W, T>,
    ) {
        session.release_window();
        debug!("Main window closed");
    }

    /// `download:start`: shrink to the download height.
    pub fn on_download_start<W: ShellWindow, T: StatusTray>(
        &self,
        session: &mut ApplicationSession<W, T>,
    ) {
        match session.live_window_mut() {
            Some(window) => window.set_size(self.prefs.width, self.prefs.download_height, true),
            None => debug!("download:start ignored, no main window"),
        }
    }

    /// `download:complete`: restore the resting height if `resize`.
    pub fn on_download_complete<W: ShellWindow, T: StatusTray>(
        &self,
        session: &mut ApplicationSession<W, T>,
        resize: bool,
    ) {
        if !resize {
            return;
        }
        match session.live_window_mut() {
            Some(window) => window.set_size(self.prefs.width, self.prefs.height, true),
            None => debug!("download:complete ignored, no main window"),
        }
    }

    /// `scan:init`: zero the badge and clear the overlay.
    pub fn on_scan_init<D: Desktop>(
        &self,
        session: &mut ApplicationSession<D::Window, D::Tray>,
        desktop: &mut D,
    ) {
        session.badge_count = 0;
        desktop.set_badge_count(0);
        if let Some(window) = session.live_window_mut() {
            window.set_overlay_icon(None, NO_VIOLATIONS_DESCRIPTION);
        }
    }

    /// `scan:violation`: show `count` on the dock badge, or as a window overlay.
    #[instrument(skip(self, session, desktop, badge_data_url))]
    pub fn on_scan_violation<D: Desktop>(
        &self,
        session: &mut ApplicationSession<D::Window, D::Tray>,
        desktop: &mut D,
        badge_data_url: &str,
        count: u32,
    ) {
        session.badge_count = count;

        if desktop.platform().has_native_badge() {
            desktop.set_badge_count(count);
            return;
        }

        let overlay = match decode_data_url(badge_data_url)
            .and_then(|png| desktop.decode_overlay(&png))
        {
            Ok(overlay) => overlay,
            Err(e) => {
                warn!(error = %e, "Failed to decode violation badge");
                return;
            }
        };

        match session.live_window_mut() {
            Some(window) => window.set_overlay_icon(Some(&overlay), &violations_description(count)),
            None => debug!("scan:violation overlay skipped, no main window"),
        }
    }

    /// Server hook: show `status` in the tray. `None` means PASS.
    pub fn set_tray_status<W: ShellWindow, T: StatusTray<Image = I>>(
        &self,
        session: &mut ApplicationSession<W, T>,
        status: Option<ScanStatus>,
    ) {
        let status = status.unwrap_or_default();
        let Some(tray) = session.tray.as_mut() else {
            debug!(status = %status, "Tray status ignored, no tray");
            return;
        };

        match tray.set_image(self.icons.icon(status)) {
            Ok(()) => {
                session.tray_status = status;
                debug!(status = %status, "Tray status updated");
            }
            Err(e) => warn!(status = %status, error = %e, "Failed to update tray icon"),
        }
    }
}
