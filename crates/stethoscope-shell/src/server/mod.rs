//! Local background server the renderer and scan engine talk to.
//!
//! Bound to loopback only. Hooks into the shell are forwarded to the event
//! loop through [`ServerHooks`]; renderer IPC arrives over a websocket.

mod routes;

pub(crate) use routes::{ServerState, router};

use stethoscope_shell_core::{
    BuildMode, CoreResult, EventSink, ServerControl, ServerFault, ServerHooks, ServerLauncher,
};

use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::{net::TcpListener, runtime::Handle, sync::oneshot};
use tracing::{debug, error, info, instrument};

/// [`ServerLauncher`] for the axum server.
pub(crate) struct ScanServer {
    port: u16,
    runtime: Handle,
    sink: Arc<dyn EventSink>,
}

impl ScanServer {
    pub(crate) fn new(port: u16, runtime: Handle, sink: Arc<dyn EventSink>) -> Self {
        Self {
            port,
            runtime,
            sink,
        }
    }
}

impl ServerLauncher for ScanServer {
    #[instrument(skip(self, hooks))]
    fn start(&mut self, mode: BuildMode, hooks: ServerHooks) -> CoreResult<Arc<dyn ServerControl>> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let control = Arc::new(ScanServerControl {
            listening: AtomicBool::new(false),
            shutdown: Mutex::new(Some(shutdown_tx)),
        });

        let state = ServerState::new(mode, hooks.clone(), Arc::clone(&self.sink));
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.port));

        self.runtime.spawn(run_server(
            addr,
            state,
            hooks,
            Arc::clone(&control),
            shutdown_rx,
        ));

        Ok(control)
    }
}

/// Handle on a started [`ScanServer`].
pub(crate) struct ScanServerControl {
    listening: AtomicBool,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl ServerControl for ScanServerControl {
    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.listening.store(false, Ordering::SeqCst);
        let sender = self
            .shutdown
            .lock()
            .map(|mut shutdown| shutdown.take())
            .unwrap_or_else(|poisoned| poisoned.into_inner().take());
        if let Some(sender) = sender {
            let _ = sender.send(());
        }
    }
}

async fn run_server(
    addr: SocketAddr,
    state: ServerState,
    hooks: ServerHooks,
    control: Arc<ScanServerControl>,
    shutdown: oneshot::Receiver<()>,
) {
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, error = %e, "Background server failed to bind");
            hooks.report_fault(ServerFault::from(&e));
            return;
        }
    };

    // close() may already have run while the bind was in flight.
    let still_wanted = control
        .shutdown
        .lock()
        .map(|shutdown| shutdown.is_some())
        .unwrap_or(false);
    if !still_wanted {
        debug!("Background server closed before it started listening");
        return;
    }

    control.listening.store(true, Ordering::SeqCst);
    info!(addr = %addr, "Background server listening");

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.await;
        })
        .await;

    control.listening.store(false, Ordering::SeqCst);

    match result {
        Ok(()) => info!("Background server stopped"),
        Err(e) => {
            error!(error = %e, "Background server failed");
            hooks.report_fault(ServerFault::from(&e));
        }
    }
}
