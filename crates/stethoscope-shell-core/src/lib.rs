//! Stethoscope shell core library.
//!
//! Process-lifecycle coordination for the Stethoscope desktop shell:
//! single-instance handling, deep-link routing into update checks, tray and
//! badge state driven by scan results, and window sizing driven by renderer
//! IPC. All of it runs against the [`Desktop`] traits, so the same logic is
//! exercised by the real window system and by tests.
//!
//! # Example
//!
//! ```
//! use stethoscope_shell_core::{DeepLinkIntent, DeepLinkPayload, classify};
//!
//! let intent = classify(&DeepLinkPayload::Url("stethoscope://update/check".to_string()));
//! assert_eq!(intent, DeepLinkIntent::UpdateRequested);
//! ```

mod deep_link;
mod desktop;
mod error;
pub mod fatal;
mod instance;
mod ipc;
mod lifecycle;
pub mod origin_policy;
mod scan_status;
mod server;
mod status_icons;
mod update;
mod window;

pub use {
    deep_link::{
        DEBUGGER_FLAG, DeepLinkIntent, DeepLinkPayload, DeepLinkSlot, LaunchArgs, UPDATE_TOKEN,
        classify,
    },
    desktop::{Desktop, Platform, ShellWindow, StatusTray},
    error::{Result as CoreResult, ShellError},
    instance::{InstanceLock, InstanceRole, LoopbackInstanceLock, SecondLaunch},
    ipc::IpcMessage,
    lifecycle::{
        ALREADY_RUNNING_NOTICE, AppLifecycleController, ApplicationSession, Collaborators,
        EventSink, Flow, LaunchContext, LifecycleState, ServerEvent, ServerFault, ShellEvent,
        TrayAction,
    },
    origin_policy::{APP_ORIGIN, APP_SCHEME, RequestHeaders, RequestHeadersHook},
    scan_status::ScanStatus,
    server::{ServerControl, ServerHooks, ServerLauncher, ServerSlot},
    status_icons::StatusIconRegistry,
    update::{
        UpdateCheckKind, UpdateFuture, UpdateOrchestrator, UpdateOutcome, UpdateReport,
        UpdateService, UpdateTrigger,
    },
    window::{
        BUILD_MODE_ENV, BuildMode, ContentSource, DOWNLOAD_WINDOW_HEIGHT, NO_VIOLATIONS_DESCRIPTION,
        START_URL_ENV, WINDOW_HEIGHT, WINDOW_WIDTH, WindowLifecycleManager, WindowPreferences,
        decode_data_url, violations_description,
    },
};

#[cfg(test)]
mod tests;
