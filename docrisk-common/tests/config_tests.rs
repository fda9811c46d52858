//! Configuration loading and graceful degradation
//!
//! Missing or malformed config files must never stop the service; they fall
//! back to built-in defaults. Tests that touch DOCRISK_* environment variables
//! are marked #[serial] so they do not race each other.

use docrisk_common::config::{resolve_config_path, API_TOKEN_ENV_VAR, CONFIG_ENV_VAR};
use docrisk_common::AppConfig;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    let config = AppConfig::load_from(Some(&path));
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_no_path_uses_defaults() {
    assert_eq!(AppConfig::load_from(None), AppConfig::default());
}

#[test]
fn test_malformed_file_falls_back_entirely() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("docrisk.toml");
    // Valid key followed by garbage: nothing from the file may leak through
    std::fs::write(&path, "max_workers = 16\nthis is [not toml\n").unwrap();

    let config = AppConfig::load_from(Some(&path));
    assert_eq!(config.max_workers, 4);
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_full_file_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("docrisk.toml");
    std::fs::write(
        &path,
        r#"
api_token = "hf_test"
api_url = "http://127.0.0.1:9999/classify"
watch_dir = "/srv/inbox"
output_dir = "/srv/reports"
db_path = "/srv/db/analyses.db"
max_workers = 2
request_timeout = 10
max_retries = 3
retry_backoff_ms = 50

[risk_weights]
compliance = 1.6
legal = 1.5

[risk_thresholds]
high = 0.8
medium = 0.5

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(Some(&path));
    assert_eq!(config.api_token, "hf_test");
    assert_eq!(config.api_url, "http://127.0.0.1:9999/classify");
    assert_eq!(config.watch_dir, PathBuf::from("/srv/inbox"));
    assert_eq!(config.db_path, PathBuf::from("/srv/db/analyses.db"));
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.risk_weights.len(), 2);
    assert_eq!(config.risk_weights.iter().next(), Some(("compliance", 1.6)));
    assert_eq!(config.risk_thresholds.medium, 0.5);
    assert_eq!(config.logging.level, "debug");
    // Unset inside [logging] keeps its default
    assert_eq!(config.logging.file, Some(PathBuf::from("legal_analysis.log")));
}

#[test]
fn test_ensure_directories_creates_missing() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig {
        watch_dir: temp_dir.path().join("in/nested"),
        output_dir: temp_dir.path().join("out"),
        db_path: temp_dir.path().join("db/analyses.db"),
        ..AppConfig::default()
    };

    config.ensure_directories().unwrap();
    assert!(config.watch_dir.is_dir());
    assert!(config.output_dir.is_dir());
    assert!(temp_dir.path().join("db").is_dir());
}

#[test]
fn test_ensure_directories_fails_on_file_in_the_way() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let config = AppConfig {
        watch_dir: blocker.join("docs"),
        output_dir: temp_dir.path().join("out"),
        ..AppConfig::default()
    };

    assert!(config.ensure_directories().is_err());
}

#[test]
#[serial]
fn test_cli_path_wins_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/from/env.toml");
    let cli = PathBuf::from("/from/cli.toml");

    assert_eq!(resolve_config_path(Some(&cli)), Some(cli.clone()));
    assert_eq!(resolve_config_path(None), Some(PathBuf::from("/from/env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_token_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("docrisk.toml");
    std::fs::write(&path, "api_token = \"from-file\"\n").unwrap();

    env::set_var(API_TOKEN_ENV_VAR, "from-env");
    let config = AppConfig::load(Some(&path));
    assert_eq!(config.api_token, "from-env");

    env::set_var(API_TOKEN_ENV_VAR, "   ");
    let config = AppConfig::load(Some(&path));
    assert_eq!(config.api_token, "from-file");

    env::remove_var(API_TOKEN_ENV_VAR);
}
