use crate::desktop::{SharedHeadersHook, webview};

use stethoscope_shell_core::{CoreResult, EventSink, ShellError, ShellWindow};

use std::{panic::Location, rc::Rc, sync::Arc};

use error_location::ErrorLocation;
use tao::{
    dpi::LogicalSize,
    window::{Icon, Window, WindowId},
};
use tracing::{debug, info, instrument};
use url::Url;
use wry::WebView;

/// The main window: a native tao window hosting the renderer webview.
///
/// The webview is created by the first content load. Renderer IPC from
/// `window.ipc.postMessage` is forwarded to the event loop.
pub struct TaoWindow {
    // Dropped before the window it lives in.
    webview: Option<WebView>,
    window: Option<Rc<Window>>,
    devtools: bool,
    headers_hook: SharedHeadersHook,
    sink: Arc<dyn EventSink>,
}

impl TaoWindow {
    pub(crate) fn new(
        window: Rc<Window>,
        devtools: bool,
        headers_hook: SharedHeadersHook,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            webview: None,
            window: Some(window),
            devtools,
            headers_hook,
            sink,
        }
    }

    /// Id of the native window, while it exists.
    pub fn id(&self) -> Option<WindowId> {
        self.window.as_ref().map(|window| window.id())
    }
}

impl ShellWindow for TaoWindow {
    type Overlay = Icon;

    fn is_destroyed(&self) -> bool {
        self.window.is_none()
    }

    fn is_minimized(&self) -> bool {
        self.window
            .as_ref()
            .is_some_and(|window| window.is_minimized())
    }

    fn restore(&mut self) {
        if let Some(window) = &self.window {
            window.set_minimized(false);
        }
    }

    fn focus(&mut self) {
        if let Some(window) = &self.window {
            window.set_visible(true);
            window.set_focus();
        }
    }

    fn set_size(&mut self, width: u32, height: u32, animate: bool) {
        if let Some(window) = &self.window {
            debug!(width, height, animate, "Resizing main window");
            window.set_inner_size(LogicalSize::new(width, height));
        }
    }

    fn set_overlay_icon(&mut self, icon: Option<&Icon>, description: &str) {
        let Some(window) = &self.window else {
            return;
        };

        #[cfg(target_os = "windows")]
        {
            use tao::platform::windows::WindowExtWindows;
            window.set_overlay_icon(icon);
        }

        #[cfg(not(target_os = "windows"))]
        let _ = window;

        debug!(has_icon = icon.is_some(), description, "Overlay icon updated");
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn load_content(&mut self, url: &Url) -> CoreResult<()> {
        let location = Location::caller();
        let Some(window) = &self.window else {
            return Err(ShellError::Window {
                reason: "Main window already destroyed".to_string(),
                location: ErrorLocation::from(location),
            });
        };

        let headers = webview::request_headers(self.headers_hook.borrow().as_ref());

        if let Some(view) = &self.webview {
            view.load_url_with_headers(url.as_str(), headers)
                .map_err(|e| ShellError::Window {
                    reason: format!("Failed to load {}: {}", url, e),
                    location: ErrorLocation::from(location),
                })?;
        } else {
            let view = webview::build(window, url, headers, self.devtools, Arc::clone(&self.sink))?;
            self.webview = Some(view);
        }

        info!(url = %url, "Main window content loading");
        Ok(())
    }

    fn open_devtools(&mut self) {
        match &self.webview {
            Some(view) if self.devtools => {
                view.open_devtools();
                info!("Renderer inspector opened");
            }
            _ => debug!("No inspectable webview, skipping inspector"),
        }
    }

    fn destroy(&mut self) {
        self.webview.take();
        if self.window.take().is_some() {
            debug!("Native main window dropped");
        }
    }
}
