//! Configuration management for stethoscope-shell.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{InstanceConfig, ServerConfig, UiConfig, UpdatesConfig},
};

use std::{
    env, fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_ICON_DIR: &str = "assets";

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Background server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Single-instance lock settings.
    #[serde(default)]
    pub instance: InstanceConfig,
    /// Update feed settings.
    #[serde(default)]
    pub updates: UpdatesConfig,
    /// Asset locations.
    #[serde(default)]
    pub ui: UiConfig,
}

impl ShellConfig {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `config_path`, writing defaults there if it
    /// does not exist.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            info!(config_path = ?config_path, "No config found, writing defaults");
            let config = ShellConfig::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let location = Location::caller();
        let config = fs::read_to_string(config_path)
            .map_err(|e| config_error(location, format!("Failed to read config: {}", e)))
            .and_then(|contents| {
                toml::from_str::<ShellConfig>(&contents)
                    .map_err(|e| config_error(location, format!("Failed to parse config: {}", e)))
            })?;

        info!(
            config_path = ?config_path,
            server_port = config.server.port,
            instance_port = config.instance.port,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Write to `config_path` through a temp file and a rename, so a crash
    /// mid-write never leaves a truncated config.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let location = Location::caller();
        let contents = toml::to_string_pretty(self)
            .map_err(|e| config_error(location, format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = config_path.parent().filter(|parent| !parent.exists()) {
            fs::create_dir_all(parent)?;
            debug!(config_dir = ?parent, "Created config directory");
        }

        let temp_path = config_path.with_extension("toml.tmp");
        fs::File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(contents.as_bytes())?;
                file.sync_all()
            })
            .map_err(|e| config_error(location, format!("Failed to write temp config: {}", e)))?;

        fs::rename(&temp_path, config_path).map_err(|e| {
            config_error(location, format!("Failed to move temp config into place: {}", e))
        })?;

        debug!(config_path = ?config_path, "Configuration saved");

        Ok(())
    }

    /// Directory the status icons are read from.
    ///
    /// A relative `icon_dir` is resolved against `resources_dir`.
    pub fn icon_dir(&self, resources_dir: &Path) -> PathBuf {
        match &self.ui.icon_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => resources_dir.join(dir),
            None => resources_dir.join(DEFAULT_ICON_DIR),
        }
    }

    /// Directory the daily log files are written to.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.data_local_dir().join("logs"))
    }

    /// Directory holding the executable and its bundled resources.
    #[track_caller]
    pub fn resources_dir() -> AppResult<PathBuf> {
        let location = Location::caller();
        let exe = env::current_exe()?;
        exe.parent().map(Path::to_path_buf).ok_or_else(|| {
            config_error(
                location,
                format!("Executable has no parent directory: {}", exe.display()),
            )
        })
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        let location = Location::caller();
        ProjectDirs::from("com", "stethoscope", "Stethoscope")
            .ok_or_else(|| config_error(location, "Failed to get project directories".to_string()))
    }
}

fn config_error(location: &'static Location<'static>, reason: String) -> AppError {
    AppError::ConfigError {
        reason,
        location: ErrorLocation::from(location),
    }
}
