//! Configuration loader and overlay tests

use chb_hosting::{AppConfig, ConfigLoader, ConfigOverlay, HostConfiguration};
use tempfile::TempDir;

#[test]
fn test_config_loader_defaults() {
    let config = ConfigLoader::new()
        .with_env_prefix("CHB_TEST_NONE")
        .load()
        .unwrap();

    assert_eq!(config.host.shutdown_timeout_secs, 30);
    assert!(config.host.handle_process_signals);
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json_format);
}

#[test]
fn test_config_file_overrides_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("chb.toml");
    std::fs::write(
        &config_path,
        "[host]\nshutdown_timeout_secs = 5\n\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let config = ConfigLoader::new()
        .with_config_path(&config_path)
        .with_env_prefix("CHB_TEST_NONE")
        .load()
        .unwrap();

    assert_eq!(config.host.shutdown_timeout_secs, 5);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_save_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("saved.toml");

    let mut original = AppConfig::default();
    original.host.shutdown_timeout_secs = 12;
    original.logging.json_format = true;

    let loader = ConfigLoader::new();
    loader.save_to_file(&original, &config_path).unwrap();

    let loaded = ConfigLoader::new()
        .with_config_path(&config_path)
        .with_env_prefix("CHB_TEST_NONE")
        .load()
        .unwrap();

    assert_eq!(loaded.host.shutdown_timeout_secs, 12);
    assert!(loaded.logging.json_format);
}

#[test]
fn test_overlay_overrides_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("chb.toml");
    std::fs::write(&config_path, "[host]\nshutdown_timeout_secs = 5\n").unwrap();

    let mut overlay = ConfigOverlay::new();
    overlay.push("host.shutdown_timeout_secs", Some("9".to_string()));

    let config = ConfigLoader::new()
        .with_config_path(&config_path)
        .with_env_prefix("CHB_TEST_NONE")
        .with_overlay(overlay)
        .load()
        .unwrap();

    assert_eq!(config.host.shutdown_timeout_secs, 9);
}

#[test]
fn test_overlay_last_write_wins_in_typed_config() {
    let mut overlay = ConfigOverlay::new();
    overlay.push("host.shutdown_timeout_secs", Some("7".to_string()));
    overlay.push("host.shutdown_timeout_secs", Some("11".to_string()));

    let config = ConfigLoader::new()
        .with_env_prefix("CHB_TEST_NONE")
        .with_overlay(overlay)
        .load()
        .unwrap();

    assert_eq!(config.host.shutdown_timeout_secs, 11);
}

#[test]
fn test_invalid_shutdown_timeout_rejected() {
    let mut overlay = ConfigOverlay::new();
    overlay.push("host.shutdown_timeout_secs", Some("0".to_string()));

    let result = ConfigLoader::new()
        .with_env_prefix("CHB_TEST_NONE")
        .with_overlay(overlay)
        .load();

    assert!(result.is_err());
}

#[test]
fn test_invalid_log_level_rejected() {
    let mut overlay = ConfigOverlay::new();
    overlay.push("logging.level", Some("loud".to_string()));

    let result = ConfigLoader::new()
        .with_env_prefix("CHB_TEST_NONE")
        .with_overlay(overlay)
        .load();

    assert!(result.is_err());
}

#[test]
fn test_overlay_merged_last_write_wins() {
    let overlay = ConfigOverlay::from_pairs([
        ("foo".to_string(), Some("1".to_string())),
        ("foo".to_string(), Some("2".to_string())),
        ("bar".to_string(), None),
    ]);

    let merged = overlay.merged();
    assert_eq!(merged.get("foo"), Some(&Some("2".to_string())));
    assert_eq!(merged.get("bar"), Some(&None));
}

#[test]
fn test_host_configuration_preserves_valueless_keys() {
    let overlay = ConfigOverlay::from_pairs([
        ("foo".to_string(), Some("1".to_string())),
        ("bar".to_string(), None),
    ]);

    let view = HostConfiguration::from_overlay(&overlay);
    assert_eq!(view.len(), 2);
    assert_eq!(view.get("foo"), Some(Some("1")));
    assert_eq!(view.get("bar"), Some(None));
    assert_eq!(view.get("missing"), None);
    assert!(view.contains("bar"));
}
