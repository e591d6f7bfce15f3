use crate::{IpcMessage, ScanStatus};

use std::{io, path::PathBuf};

/// Everything the controller reacts to, from any source.
///
/// OS callbacks, renderer IPC, the background server and the tray all end
/// up as one of these on the event loop, processed in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// Application finished launching.
    Ready,
    /// OS activation with no window, e.g. a dock icon click.
    Activate,
    /// OS deep link while running.
    OpenUrl(String),
    /// Another launch was redirected into this instance.
    SecondInstance {
        /// The second launch's full argv, executable first.
        args: Vec<String>,
        /// The second launch's working directory.
        cwd: PathBuf,
    },
    /// Renderer IPC message.
    Ipc(IpcMessage),
    /// Background server hook or fault.
    Server(ServerEvent),
    /// The tray icon was clicked.
    TrayClicked,
    /// A tray menu entry was chosen.
    TrayMenu(TrayAction),
    /// The user closed the main window.
    MainWindowClosed,
    /// Something asked the application to quit.
    QuitRequested,
    /// The process is about to exit.
    BeforeQuit,
    /// An unexpected failure reached the top level.
    UncaughtError(String),
}

/// Events raised by the background server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Scan status hook.
    SetScanStatus(ScanStatus),
    /// Update request hook.
    RequestUpdate,
    /// The server failed.
    Error(ServerFault),
}

/// Failure reported by the background server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFault {
    /// The server port is already taken, usually by another instance.
    AddrInUse,
    /// Any other failure.
    Other(String),
}

impl From<&io::Error> for ServerFault {
    fn from(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::AddrInUse => ServerFault::AddrInUse,
            _ => ServerFault::Other(error.to_string()),
        }
    }
}

/// Tray menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    /// Show the main window.
    Open,
    /// Run an interactive update check.
    CheckForUpdates,
    /// Quit the application.
    Quit,
}

/// Posts events onto the event loop from any thread.
pub trait EventSink: Send + Sync {
    /// Queue `event` for the controller.
    fn emit(&self, event: ShellEvent);
}
