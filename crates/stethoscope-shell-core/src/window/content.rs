use crate::{CoreResult, ShellError};

use std::{
    env,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, instrument};
use url::Url;

/// Environment variable overriding where the UI is loaded from.
pub const START_URL_ENV: &str = "STETHOSCOPE_START_URL";

/// Where the main window loads its UI from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Development server or other explicit override.
    Override(Url),
    /// The packaged UI bundle on disk.
    Bundle(PathBuf),
}

impl ContentSource {
    /// Pick the override if present, otherwise `build/index.html` under `bundle_root`.
    #[track_caller]
    #[instrument(skip(bundle_root))]
    pub fn resolve(override_url: Option<&str>, bundle_root: &Path) -> CoreResult<Self> {
        match override_url.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => {
                let url = Url::parse(raw).map_err(|e| ShellError::InvalidContentSource {
                    reason: format!("Failed to parse override URL {raw:?}: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;
                debug!(url = %url, "Using content override");
                Ok(ContentSource::Override(url))
            }
            None => Ok(ContentSource::Bundle(
                bundle_root.join("build").join("index.html"),
            )),
        }
    }

    /// Resolve using [`START_URL_ENV`].
    #[track_caller]
    pub fn from_env(bundle_root: &Path) -> CoreResult<Self> {
        let override_url = env::var(START_URL_ENV).ok();
        Self::resolve(override_url.as_deref(), bundle_root)
    }

    /// The URL handed to the window.
    #[track_caller]
    pub fn url(&self) -> CoreResult<Url> {
        match self {
            ContentSource::Override(url) => Ok(url.clone()),
            ContentSource::Bundle(path) => {
                Url::from_file_path(path).map_err(|()| ShellError::InvalidContentSource {
                    reason: format!("Bundle path is not absolute: {}", path.display()),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}
