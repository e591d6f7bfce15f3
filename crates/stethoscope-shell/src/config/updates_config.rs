use crate::config::default_auto_check;

use serde::{Deserialize, Serialize};

/// Update feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatesConfig {
    /// Release manifest URL. No checks are made without one.
    #[serde(default)]
    pub feed_url: Option<String>,
    /// Run the background check at first launch.
    #[serde(default = "default_auto_check")]
    pub auto_check: bool,
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            auto_check: default_auto_check(),
        }
    }
}
