//! wry webview hosting the renderer inside the main window.

use stethoscope_shell_core::{
    CoreResult, EventSink, IpcMessage, RequestHeaders, RequestHeadersHook, ShellError, ShellEvent,
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tao::window::Window;
use tracing::{debug, warn};
use url::Url;
use wry::{
    WebView, WebViewBuilder,
    http::{HeaderMap, HeaderName, HeaderValue},
};

/// Decode one renderer message and post it to the event loop.
pub(crate) fn forward_ipc(sink: &dyn EventSink, text: &str) {
    match IpcMessage::from_json(text) {
        Ok(message) => {
            debug!(channel = message.channel(), "Renderer message received");
            sink.emit(ShellEvent::Ipc(message));
        }
        Err(e) => warn!(error = %e, "Dropped renderer message"),
    }
}

/// Headers for one content request after `hook` has run over them.
pub(crate) fn request_headers(hook: Option<&RequestHeadersHook>) -> HeaderMap {
    let mut headers = RequestHeaders::new();
    if let Some(hook) = hook {
        hook(&mut headers);
    }

    let mut map = HeaderMap::new();
    for (name, value) in &headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!(header = %name, "Skipping header that is not valid HTTP"),
        }
    }
    map
}

/// Build the webview inside `window` and start loading `url`.
#[track_caller]
pub(crate) fn build(
    window: &Window,
    url: &Url,
    headers: HeaderMap,
    devtools: bool,
    sink: Arc<dyn EventSink>,
) -> CoreResult<WebView> {
    let location = Location::caller();
    let window_error = |reason: String| ShellError::Window {
        reason,
        location: ErrorLocation::from(location),
    };

    let builder = WebViewBuilder::new()
        .with_url(url.as_str())
        .with_headers(headers)
        .with_devtools(devtools)
        .with_ipc_handler(move |request| forward_ipc(sink.as_ref(), request.body()));

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    let webview = builder.build(window);

    // GTK platforms host the webview in the window's container.
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;

        let vbox = window
            .default_vbox()
            .ok_or_else(|| window_error("Main window has no GTK container".to_string()))?;
        builder.build_gtk(vbox)
    };

    webview.map_err(|e| window_error(format!("Failed to create webview: {}", e)))
}
