//! Background server boundary.
//!
//! The server's own logic lives elsewhere. The shell starts it, hands it a
//! set of hooks, watches for faults and closes it on the way out.

use crate::{BuildMode, CoreResult, EventSink, ScanStatus, ServerEvent, ShellEvent};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

/// A started background server.
pub trait ServerControl: Send + Sync {
    /// The server is bound and accepting connections.
    fn is_listening(&self) -> bool;
    /// Stop accepting connections. `is_listening` is false once this returns.
    fn close(&self);
}

/// Starts the background server.
pub trait ServerLauncher {
    /// Start the server in `mode`. Faults after startup arrive through `hooks`.
    fn start(&mut self, mode: BuildMode, hooks: ServerHooks) -> CoreResult<Arc<dyn ServerControl>>;
}

/// Callbacks the background server may invoke on the shell.
///
/// Calls are forwarded to the event loop, so they are safe from any thread.
#[derive(Clone)]
pub struct ServerHooks {
    sink: Arc<dyn EventSink>,
}

impl ServerHooks {
    /// Hooks posting to `sink`.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Report the latest scan status. `None` means PASS.
    pub fn set_scan_status(&self, status: Option<&str>) {
        let status = match status {
            None => ScanStatus::default(),
            Some(raw) => match raw.parse::<ScanStatus>() {
                Ok(status) => status,
                Err(e) => {
                    warn!(error = %e, "Ignoring scan status from server");
                    return;
                }
            },
        };
        self.sink
            .emit(ShellEvent::Server(ServerEvent::SetScanStatus(status)));
    }

    /// Ask the shell to check for updates.
    pub fn request_update(&self) {
        self.sink.emit(ShellEvent::Server(ServerEvent::RequestUpdate));
    }

    /// Report a server fault.
    pub fn report_fault(&self, fault: crate::ServerFault) {
        self.sink.emit(ShellEvent::Server(ServerEvent::Error(fault)));
    }
}

/// Shared slot holding the running server, if any.
///
/// The session owns one handle and the crash path holds another, so the
/// server can be closed from a panic hook on any thread.
#[derive(Clone, Default)]
pub struct ServerSlot {
    inner: Arc<Mutex<Option<Arc<dyn ServerControl>>>>,
}

impl ServerSlot {
    fn guard(&self) -> MutexGuard<'_, Option<Arc<dyn ServerControl>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store the started server, closing any previous one.
    pub fn set(&self, server: Arc<dyn ServerControl>) {
        if let Some(previous) = self.guard().replace(server) {
            previous.close();
        }
    }

    /// Drop the server without closing it.
    pub fn clear(&self) -> Option<Arc<dyn ServerControl>> {
        self.guard().take()
    }

    /// A server is stored.
    pub fn is_started(&self) -> bool {
        self.guard().is_some()
    }

    /// A server is stored and accepting connections.
    pub fn is_listening(&self) -> bool {
        self.guard()
            .as_ref()
            .is_some_and(|server| server.is_listening())
    }

    /// Close the server if it is listening. Returns whether it was.
    pub fn close_if_listening(&self) -> bool {
        let guard = self.guard();
        match guard.as_ref() {
            Some(server) if server.is_listening() => {
                server.close();
                info!("Background server closed");
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for ServerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSlot")
            .field("started", &self.is_started())
            .field("listening", &self.is_listening())
            .finish()
    }
}
