use crate::config::default_instance_port;

use serde::{Deserialize, Serialize};

/// Single-instance lock configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Loopback port held by the primary instance.
    #[serde(default = "default_instance_port")]
    pub port: u16,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            port: default_instance_port(),
        }
    }
}
