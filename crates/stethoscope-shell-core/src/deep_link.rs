//! Deep-link classification and the pending-intent slot.
//!
//! Deep links reach the shell either as an OS `open-url` callback or as
//! command-line arguments, depending on the platform. Both are reduced to a
//! [`DeepLinkIntent`] here; deciding what to do with it is the caller's job.

use tracing::debug;

/// Token whose presence anywhere in a payload requests an update check.
pub const UPDATE_TOKEN: &str = "update";

/// Command-line flag that enables the inspection panel and window resizing.
pub const DEBUGGER_FLAG: &str = "enableDebugger";

/// Raw activation payload delivered by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLinkPayload {
    /// A URL from the `open-url` callback.
    Url(String),
    /// Command-line arguments, executable path excluded.
    Args(Vec<String>),
}

impl DeepLinkPayload {
    /// The string form the classification runs over.
    ///
    /// Argument lists are joined with `,`.
    pub fn to_payload_string(&self) -> String {
        match self {
            DeepLinkPayload::Url(url) => url.clone(),
            DeepLinkPayload::Args(args) => args.join(","),
        }
    }
}

/// What an activation asks the shell to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeepLinkIntent {
    /// Plain launch or refocus.
    #[default]
    None,
    /// Launch into the updater.
    UpdateRequested,
}

impl DeepLinkIntent {
    /// Whether this intent asks for an update check.
    pub fn is_update(&self) -> bool {
        matches!(self, DeepLinkIntent::UpdateRequested)
    }
}

/// Classify an activation payload.
///
/// Case-sensitive substring match on [`UPDATE_TOKEN`].
pub fn classify(payload: &DeepLinkPayload) -> DeepLinkIntent {
    let payload = payload.to_payload_string();
    let intent = if payload.contains(UPDATE_TOKEN) {
        DeepLinkIntent::UpdateRequested
    } else {
        DeepLinkIntent::None
    };
    debug!(payload = %payload, intent = ?intent, "Deep link classified");
    intent
}

/// Holds at most one pending intent until the window can act on it.
#[derive(Debug, Default)]
pub struct DeepLinkSlot {
    intent: DeepLinkIntent,
}

impl DeepLinkSlot {
    /// Record an update request. A plain intent never clears a pending request.
    pub fn remember(&mut self, intent: DeepLinkIntent) {
        if intent.is_update() {
            self.intent = intent;
        }
    }

    /// Hand out the pending intent and clear the slot.
    pub fn take(&mut self) -> DeepLinkIntent {
        std::mem::take(&mut self.intent)
    }

    /// The pending intent, without consuming it.
    pub fn peek(&self) -> DeepLinkIntent {
        self.intent
    }
}

/// Flags and payload extracted from the process arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Set when any argument contains [`DEBUGGER_FLAG`].
    pub enable_debugger: bool,
    /// Arguments after the executable path.
    pub payload: DeepLinkPayload,
}

impl LaunchArgs {
    /// Parse a full argv, executable path first.
    pub fn parse<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = argv.into_iter().skip(1).map(Into::into).collect();
        let enable_debugger = args.iter().any(|arg| arg.contains(DEBUGGER_FLAG));

        Self {
            enable_debugger,
            payload: DeepLinkPayload::Args(args),
        }
    }
}
