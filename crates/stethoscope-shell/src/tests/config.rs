use crate::config::{DEFAULT_INSTANCE_PORT, DEFAULT_SERVER_PORT, ShellConfig};

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;

fn scratch_dir() -> PathBuf {
    env::temp_dir().join(format!("stethoscope-config-{}", Uuid::new_v4()))
}

/// WHAT: A missing config file is created with defaults
/// WHY: First launch must not fail for want of a config
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_file_when_loading_then_defaults_written() {
    // Given: A path in a directory that does not exist yet
    let dir = scratch_dir();
    let path = dir.join("config.toml");

    // When
    let config = ShellConfig::load_from(&path).unwrap();

    // Then: Defaults returned and persisted
    assert_eq!(config, ShellConfig::default());
    assert!(path.exists());
    assert_eq!(ShellConfig::load_from(&path).unwrap(), config);

    fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Omitted sections and fields fall back to defaults
/// WHY: Users only write the settings they change
#[test]
#[allow(clippy::unwrap_used)]
fn given_partial_file_when_loading_then_missing_fields_defaulted() {
    // Given
    let dir = scratch_dir();
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    fs::write(
        &path,
        "[updates]\nfeed_url = \"https://updates.example.com/latest.json\"\n",
    )
    .unwrap();

    // When
    let config = ShellConfig::load_from(&path).unwrap();

    // Then
    assert_eq!(
        config.updates.feed_url.as_deref(),
        Some("https://updates.example.com/latest.json")
    );
    assert!(config.updates.auto_check);
    assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
    assert_eq!(config.instance.port, DEFAULT_INSTANCE_PORT);

    fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Malformed TOML is a config error
/// WHY: A broken file must be reported, not silently replaced
#[test]
#[allow(clippy::unwrap_used)]
fn given_malformed_file_when_loading_then_error() {
    // Given
    let dir = scratch_dir();
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    fs::write(&path, "[server\nport = ").unwrap();

    // When
    let result = ShellConfig::load_from(&path);

    // Then
    assert!(matches!(result, Err(crate::AppError::ConfigError { .. })));

    fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Saving leaves no temp file behind
/// WHY: The atomic write renames the temp file into place
#[test]
#[allow(clippy::unwrap_used)]
fn given_config_when_saved_then_only_final_file_exists() {
    // Given
    let dir = scratch_dir();
    let path = dir.join("config.toml");
    let mut config = ShellConfig::default();
    config.server.port = 40000;

    // When
    config.save_to(&path).unwrap();

    // Then
    assert!(!path.with_extension("toml.tmp").exists());
    assert_eq!(ShellConfig::load_from(&path).unwrap().server.port, 40000);

    fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Icon directories resolve against the resources directory
/// WHY: Packaged builds ship icons beside the executable
#[test]
fn given_icon_dir_settings_when_resolving_then_paths_follow_rules() {
    // Given
    let resources = Path::new("/opt/stethoscope");
    let mut config = ShellConfig::default();

    // When / Then: Default
    assert_eq!(config.icon_dir(resources), resources.join("assets"));

    // When / Then: Relative
    config.ui.icon_dir = Some(PathBuf::from("icons"));
    assert_eq!(config.icon_dir(resources), resources.join("icons"));

    // When / Then: Absolute
    let absolute = env::temp_dir().join("custom-icons");
    config.ui.icon_dir = Some(absolute.clone());
    assert_eq!(config.icon_dir(resources), absolute);
}
