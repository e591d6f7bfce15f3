mod loopback;

pub use loopback::LoopbackInstanceLock;

use crate::CoreResult;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Outcome of trying to become the live instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceRole {
    /// This process serves the user.
    Primary,
    /// Another process already does; its handler has our arguments.
    Secondary,
}

/// Single-instance guard.
pub trait InstanceLock {
    /// Try to become the primary instance.
    ///
    /// A secondary instance forwards `args` and `cwd` to the primary before
    /// returning, so the caller only has to exit.
    fn acquire(&mut self, args: &[String], cwd: &Path) -> CoreResult<InstanceRole>;
}

/// What a secondary launch tells the primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondLaunch {
    /// Full argv of the secondary launch, executable first.
    pub args: Vec<String>,
    /// Working directory of the secondary launch.
    pub cwd: PathBuf,
}
