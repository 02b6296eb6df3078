//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_murmur_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, murmur_common::ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r##"
[session]
display_name = "Striker"

[channels]
listen_volume = 30
"##,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.session.display_name, "Striker");
    assert_eq!(config.channels.listen_volume, 30);
    // Defaults preserved
    assert_eq!(config.channels.team, "team");
    assert!(config.session.enable_tts);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, murmur_common::ConfigError::ParseError(_)));
}

#[test]
fn load_config_with_invalid_values_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[session]
display_name = "Striker"
default_volume = 99
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.session.display_name, "User");
    assert_eq!(config.session.default_volume, 0);
}

#[test]
fn create_default_config_writes_parseable_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.channels.all, "all");
    assert_eq!(config.retry.join_attempts, 1);
}

#[test]
fn default_config_path_ends_with_murmur_config() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("murmur/config.toml"));
    }
}
