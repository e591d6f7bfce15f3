//! Single-instance lock on a loopback TCP port.
//!
//! Whoever binds the port is the primary. A later launch finds the port
//! taken, connects to it, writes its arguments as one JSON line and exits.

use crate::{
    CoreResult, EventSink, ShellError, ShellEvent,
    instance::{InstanceLock, InstanceRole, SecondLaunch},
};

use std::{
    io::{self, Write},
    net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener, TcpStream},
    panic::Location,
    path::Path,
    sync::Arc,
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, BufReader},
    net::TcpListener,
    runtime::Handle,
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

/// How long a secondary launch waits for the primary to accept.
const FORWARD_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound on one forwarded launch message.
const MAX_MESSAGE_BYTES: u64 = 64 * 1024;

/// Pause after a failed accept before trying again.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// [`InstanceLock`] backed by a loopback listener.
pub struct LoopbackInstanceLock {
    port: u16,
    runtime: Handle,
    sink: Arc<dyn EventSink>,
    local_addr: Option<SocketAddr>,
    accept_task: Option<JoinHandle<()>>,
}

impl LoopbackInstanceLock {
    /// Lock on `port`, delivering second launches to `sink`.
    pub fn new(port: u16, runtime: Handle, sink: Arc<dyn EventSink>) -> Self {
        Self {
            port,
            runtime,
            sink,
            local_addr: None,
            accept_task: None,
        }
    }

    /// Address of the held listener, once primary.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    #[track_caller]
    fn serve(&mut self, listener: StdTcpListener) -> CoreResult<()> {
        listener.set_nonblocking(true)?;
        self.local_addr = listener.local_addr().ok();

        let listener = {
            let _entered = self.runtime.enter();
            TcpListener::from_std(listener)?
        };

        let sink = Arc::clone(&self.sink);
        self.accept_task = Some(self.runtime.spawn(accept_loop(listener, sink)));
        Ok(())
    }

    #[track_caller]
    fn forward(&self, args: &[String], cwd: &Path) -> CoreResult<()> {
        let location = Location::caller();
        let lock_error = |reason: String| ShellError::InstanceLock {
            reason,
            location: ErrorLocation::from(location),
        };

        let message = SecondLaunch {
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        };
        let mut line = serde_json::to_string(&message)
            .map_err(|e| lock_error(format!("Failed to encode launch arguments: {e}")))?;
        line.push('\n');

        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.port));
        let mut stream = TcpStream::connect_timeout(&addr, FORWARD_TIMEOUT)
            .map_err(|e| lock_error(format!("Failed to reach primary instance on {addr}: {e}")))?;
        stream
            .write_all(line.as_bytes())
            .and_then(|()| stream.flush())
            .map_err(|e| lock_error(format!("Failed to forward launch arguments: {e}")))?;

        info!(port = self.port, "Forwarded launch to primary instance");
        Ok(())
    }
}

impl InstanceLock for LoopbackInstanceLock {
    #[track_caller]
    #[instrument(skip(self, args))]
    fn acquire(&mut self, args: &[String], cwd: &Path) -> CoreResult<InstanceRole> {
        match StdTcpListener::bind((Ipv4Addr::LOCALHOST, self.port)) {
            Ok(listener) => {
                self.serve(listener)?;
                info!(addr = ?self.local_addr, "Single instance lock acquired");
                Ok(InstanceRole::Primary)
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                info!(port = self.port, "Another instance holds the lock");
                self.forward(args, cwd)?;
                Ok(InstanceRole::Secondary)
            }
            Err(e) => Err(ShellError::InstanceLock {
                reason: format!("Failed to bind instance port {}: {e}", self.port),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl Drop for LoopbackInstanceLock {
    fn drop(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
    }
}

async fn accept_loop(listener: TcpListener, sink: Arc<dyn EventSink>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let sink = Arc::clone(&sink);
                tokio::spawn(async move {
                    if let Err(e) = read_launch(stream, sink).await {
                        warn!(peer = %peer, error = %e, "Dropped malformed second launch");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "Instance listener accept failed");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
            }
        }
    }
}

async fn read_launch(stream: tokio::net::TcpStream, sink: Arc<dyn EventSink>) -> io::Result<()> {
    let mut reader = BufReader::new(stream.take(MAX_MESSAGE_BYTES));
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let launch: SecondLaunch = serde_json::from_str(line.trim_end())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    debug!(args = ?launch.args, cwd = ?launch.cwd, "Second launch received");
    sink.emit(ShellEvent::SecondInstance {
        args: launch.args,
        cwd: launch.cwd,
    });
    Ok(())
}
