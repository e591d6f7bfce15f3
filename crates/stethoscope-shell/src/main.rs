//! Stethoscope: desktop shell for the device security scanner.

mod app;
mod config;
mod desktop;
mod error;
mod icons;
mod logging;
mod server;
#[cfg(test)]
mod tests;
mod tray_manager;
mod updater;

pub(crate) use {
    desktop::{DesktopState, TaoDesktop, TaoWindow},
    error::{AppError, Result as AppResult},
    server::ScanServer,
    tray_manager::TrayManager,
    updater::FeedUpdateService,
};

use crate::config::ShellConfig;

use tracing::{error, warn};

/// Application entry point.
fn main() {
    let log_guard = match ShellConfig::log_dir().and_then(|dir| logging::init(&dir)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::init_console();
            warn!(error = ?e, "File logging unavailable, logging to console only");
            None
        }
    };

    let config = match ShellConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app::run(config, log_guard) {
        error!("Failed to start shell: {:?}", e);
        std::process::exit(1);
    }
}
