//! Tests for configuration loading, saving, and validation

use status_tray::error::AppError;
use status_tray::settings::config::{AppConfig, ConfigManager, CONFIG_VERSION};
use status_tray::tray::IconState;
use std::path::{Path, PathBuf};

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.config_version, CONFIG_VERSION);
    assert_eq!(config.tray.tooltip(), Some("Status Tray".to_string()));
    assert!(!config.tray.menu_on_left_click);
    assert_eq!(config.tray.poll_interval_ms, 50);
    assert_eq!(config.tray.handler_budget_ms, 100);
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.max_file_size, 5 * 1024 * 1024);
    assert_eq!(config.logging.max_files, 3);
}

#[test]
fn test_default_icons() {
    let config = AppConfig::default();
    assert_eq!(
        config.icons.path_for(IconState::Idle),
        Path::new("resources/icon_idle.png")
    );
    assert_eq!(
        config.icons.path_for(IconState::Disabled),
        Path::new("resources/icon_disabled.png")
    );
}

#[test]
fn test_config_roundtrip() {
    let mut config = AppConfig::default();
    config.tray.tooltip = "Sync agent".to_string();
    config.tray.menu_on_left_click = true;
    config.icons.busy = PathBuf::from("icons/spinner.ico");
    config.logging.level = "debug".to_string();

    let toml_str = toml::to_string(&config).expect("Serialization failed");
    let parsed: AppConfig = toml::from_str(&toml_str).expect("Deserialization failed");

    assert_eq!(parsed, config);
}

#[test]
fn test_config_partial_deserialization() {
    let partial_toml = r#"
        [tray]
        tooltip = ""

        [icons]
        busy = "busy.png"
    "#;

    let config: AppConfig = toml::from_str(partial_toml).expect("Partial deserialization failed");

    assert_eq!(config.config_version, CONFIG_VERSION);
    assert_eq!(config.tray.tooltip(), None);
    assert_eq!(config.tray.poll_interval_ms, 50);
    assert_eq!(config.icons.busy, PathBuf::from("busy.png"));
    assert_eq!(config.icons.idle, PathBuf::from("resources/icon_idle.png"));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_config_with_extra_fields() {
    let toml_with_extra = r#"
        config_version = 1
        unknown_field = "should be ignored"

        [tray]
        poll_interval_ms = 20
        also_unknown = 123
    "#;

    let config: AppConfig =
        toml::from_str(toml_with_extra).expect("Deserialization with extra fields failed");
    assert_eq!(config.tray.poll_interval_ms, 20);
}

#[test]
fn test_manager_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::with_path(dir.path().join("config.toml"));

    let config = manager.load().unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(manager.log_dir(), dir.path().join("logs"));
}

#[test]
fn test_manager_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::with_path(dir.path().join("nested").join("config.toml"));

    let mut config = AppConfig::default();
    config.tray.handler_budget_ms = 250;
    manager.save(&config).unwrap();

    assert!(manager.config_path().exists());
    assert_eq!(manager.load().unwrap(), config);
}

#[test]
fn test_manager_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[tray]\npoll_interval_ms = 0\n").unwrap();

    let manager = ConfigManager::with_path(&path);
    assert!(matches!(manager.load(), Err(AppError::ConfigError(_))));

    std::fs::write(&path, "this is not toml [").unwrap();
    assert!(matches!(manager.load(), Err(AppError::ConfigError(_))));
}

#[test]
fn test_save_refuses_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::with_path(dir.path().join("config.toml"));

    let mut config = AppConfig::default();
    config.logging.max_files = 0;
    assert!(manager.save(&config).is_err());
    assert!(!manager.config_path().exists());
}
