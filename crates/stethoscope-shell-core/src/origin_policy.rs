//! Origin rewriting for content requests and the matching server-side check.
//!
//! The UI is loaded from `file://` or a development server, neither of which
//! gives the background server a meaningful `Origin`. Every outbound content
//! request is stamped with [`APP_ORIGIN`] so the server can tell the shell's
//! own UI apart from arbitrary local web pages.

use std::collections::BTreeMap;

use url::Url;

/// Origin and referrer stamped on content requests.
pub const APP_ORIGIN: &str = "stethoscope://main";

/// URL scheme registered with the OS for deep links.
pub const APP_SCHEME: &str = "stethoscope";

/// Header name to value map for a single outbound request.
pub type RequestHeaders = BTreeMap<String, String>;

/// Hook invoked on every outbound content request before it is sent.
pub type RequestHeadersHook = Box<dyn Fn(&mut RequestHeaders) + Send + Sync>;

/// Set `Origin` and `Referer` to [`APP_ORIGIN`], replacing any existing values.
pub fn rewrite_request_headers(headers: &mut RequestHeaders) {
    headers.retain(|name, _| {
        !name.eq_ignore_ascii_case("origin") && !name.eq_ignore_ascii_case("referer")
    });
    headers.insert("Origin".to_string(), APP_ORIGIN.to_string());
    headers.insert("Referer".to_string(), APP_ORIGIN.to_string());
}

/// The hook installed at startup.
pub fn request_headers_hook() -> RequestHeadersHook {
    Box::new(rewrite_request_headers)
}

/// Whether a request carrying `origin` may use the background server.
///
/// Requests without an origin (native clients) are allowed, as are the
/// application origin and loopback HTTP origins used during development.
pub fn is_allowed_origin(origin: Option<&str>) -> bool {
    let Some(origin) = origin else {
        return true;
    };

    if origin == APP_ORIGIN {
        return true;
    }

    match Url::parse(origin) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
        }
        Err(_) => false,
    }
}
