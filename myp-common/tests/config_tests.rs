//! Config file resolution tests
//!
//! Tests that change the working directory are marked with #[serial] so they
//! never run concurrently with each other.

use myp_common::config::{resolve_config_path, TomlConfig, DEFAULT_CONFIG_FILE};
use myp_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Run `f` with the working directory set to `dir`, restoring it afterwards
fn in_dir<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir).unwrap();
    let result = f();
    env::set_current_dir(previous).unwrap();
    result
}

#[test]
fn test_explicit_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        r#"
        [artifacts]
        model = "/srv/models/model.json"
        feature_names = "/srv/models/names.json"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    assert_eq!(resolve_config_path(Some(path.as_path())), Some(path.clone()));
    let config = TomlConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(config.artifacts.model, PathBuf::from("/srv/models/model.json"));
    assert_eq!(config.artifacts.feature_names, PathBuf::from("/srv/models/names.json"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_explicit_missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = TomlConfig::load(Some(dir.path().join("absent.toml").as_path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_local_file_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[server]\nport = 9321\n").unwrap();

    let config = in_dir(dir.path(), || {
        let path = resolve_config_path(None);
        assert_eq!(path, Some(PathBuf::from(DEFAULT_CONFIG_FILE)));
        TomlConfig::load(path.as_deref())
    })
    .unwrap();
    assert_eq!(config.server.port, 9321);
}

#[test]
#[serial]
fn test_malformed_local_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[server\n").unwrap();

    let result = in_dir(dir.path(), || TomlConfig::load(resolve_config_path(None).as_deref()));
    assert!(result.is_err());
}
