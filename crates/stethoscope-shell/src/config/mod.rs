#[allow(clippy::module_inception)]
mod config;
mod instance_config;
mod server_config;
mod ui_config;
mod updates_config;

pub(crate) use {
    config::ShellConfig, instance_config::InstanceConfig, server_config::ServerConfig,
    ui_config::UiConfig, updates_config::UpdatesConfig,
};

pub(crate) const DEFAULT_SERVER_PORT: u16 = 37370;
pub(crate) const DEFAULT_INSTANCE_PORT: u16 = 37371;
pub(crate) const DEFAULT_AUTO_CHECK: bool = true;

pub(crate) fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

pub(crate) fn default_instance_port() -> u16 {
    DEFAULT_INSTANCE_PORT
}

pub(crate) fn default_auto_check() -> bool {
    DEFAULT_AUTO_CHECK
}
