//! Release-feed updater.
//!
//! Fetches a small JSON manifest describing the latest release, compares it
//! with the running version and tells the user when something newer exists.
//! Downloading and installing is left to the release page.

use crate::desktop::APP_NAME;

use stethoscope_shell_core::{
    BuildMode, CoreResult, ShellError, UpdateCheckKind, UpdateFuture, UpdateOutcome,
    UpdateService,
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use notify_rust::Notification;
use semver::Version;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Latest-release manifest served by the update feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ReleaseManifest {
    pub version: String,
    pub url: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Compare `manifest` with the running `current` version.
#[track_caller]
pub(crate) fn evaluate(manifest: &ReleaseManifest, current: &Version) -> CoreResult<UpdateOutcome> {
    let latest = Version::parse(manifest.version.trim_start_matches('v')).map_err(|e| {
        ShellError::UpdateCheckFailed {
            reason: format!("Invalid release version {:?}: {}", manifest.version, e),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    if latest > *current {
        Ok(UpdateOutcome::Available {
            version: latest.to_string(),
            url: manifest.url.clone(),
        })
    } else {
        Ok(UpdateOutcome::UpToDate)
    }
}

/// [`UpdateService`] backed by an HTTP release feed.
pub(crate) struct FeedUpdateService {
    client: reqwest::Client,
    feed_url: Option<Url>,
    current: Version,
    mode: BuildMode,
    auto_check: bool,
}

impl FeedUpdateService {
    /// Service checking `feed_url` on behalf of a `mode` build at `current`.
    #[track_caller]
    pub(crate) fn new(
        feed_url: Option<&str>,
        current: &str,
        mode: BuildMode,
        auto_check: bool,
    ) -> CoreResult<Self> {
        let location = Location::caller();
        let invalid = |reason: String| ShellError::UpdateCheckFailed {
            reason,
            location: ErrorLocation::from(location),
        };

        let feed_url = feed_url
            .map(|raw| {
                Url::parse(raw).map_err(|e| invalid(format!("Invalid feed URL {raw:?}: {e}")))
            })
            .transpose()?;
        let current = Version::parse(current)
            .map_err(|e| invalid(format!("Invalid running version {current:?}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("stethoscope-shell/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| invalid(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            feed_url,
            current,
            mode,
            auto_check,
        })
    }

    /// Why a check of `kind` is skipped, if it is.
    pub(crate) fn skip_reason(&self, kind: UpdateCheckKind) -> Option<&'static str> {
        if self.mode == BuildMode::Development {
            Some("development build")
        } else if self.feed_url.is_none() {
            Some("no update feed configured")
        } else if kind == UpdateCheckKind::CheckAndNotify && !self.auto_check {
            Some("automatic checks disabled")
        } else {
            None
        }
    }
}

impl UpdateService for FeedUpdateService {
    #[instrument(skip(self))]
    fn check(&self, kind: UpdateCheckKind) -> UpdateFuture {
        if let Some(reason) = self.skip_reason(kind) {
            info!(reason, "Skipping update check");
            return Box::pin(async { Ok(UpdateOutcome::Skipped) });
        }

        let client = self.client.clone();
        let feed_url = self.feed_url.clone();
        let current = self.current.clone();

        Box::pin(async move {
            let Some(feed_url) = feed_url else {
                return Ok(UpdateOutcome::Skipped);
            };

            let manifest = fetch_manifest(&client, feed_url).await?;
            debug!(version = %manifest.version, notes = ?manifest.notes, "Release manifest fetched");

            let outcome = evaluate(&manifest, &current)?;
            announce(kind, &outcome).await;
            Ok(outcome)
        })
    }
}

async fn fetch_manifest(client: &reqwest::Client, feed_url: Url) -> CoreResult<ReleaseManifest> {
    let failed = |reason: String| ShellError::UpdateCheckFailed {
        reason,
        location: ErrorLocation::from(Location::caller()),
    };

    client
        .get(feed_url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| failed(format!("Failed to reach update feed: {e}")))?
        .json::<ReleaseManifest>()
        .await
        .map_err(|e| failed(format!("Failed to parse release manifest: {e}")))
}

/// Tell the user about `outcome`. Interactive checks also open the release page.
async fn announce(kind: UpdateCheckKind, outcome: &UpdateOutcome) {
    let (body, open_url) = match (kind, outcome) {
        (_, UpdateOutcome::Available { version, url }) => (
            format!("Version {version} is available."),
            (kind == UpdateCheckKind::Interactive).then(|| url.clone()),
        ),
        (UpdateCheckKind::Interactive, UpdateOutcome::UpToDate) => {
            (format!("{APP_NAME} is up to date."), None)
        }
        _ => return,
    };

    let shown = tokio::task::spawn_blocking(move || {
        if let Err(e) = Notification::new().summary(APP_NAME).body(&body).show() {
            warn!(error = %e, "Failed to show update notification");
        }
        if let Some(url) = open_url {
            if let Err(e) = open::that(&url) {
                warn!(error = %e, url = %url, "Failed to open release page");
            }
        }
    })
    .await;

    if let Err(e) = shown {
        warn!(error = %e, "Update notification task failed");
    }
}
