use serde::{Deserialize, Serialize};

use std::path::PathBuf;

/// Window and tray asset configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Directory holding the status icons. Defaults to `assets` beside the executable.
    #[serde(default)]
    pub icon_dir: Option<PathBuf>,
}
