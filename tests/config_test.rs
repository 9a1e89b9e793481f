//! Integration tests for Settings config loading with layered precedence.
//!
//! These tests run without a global config (temp directories only), so they
//! exercise explicit config files layered over compiled defaults.

use std::fs;

use tempfile::TempDir;

use cadtree::application::ApplicationError;
use cadtree::config::{LoggerKind, ModelFormat, Settings, SourceKind};

#[test]
fn given_config_file_with_all_fields_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cadtree.toml");
    fs::write(
        &path,
        r#"
format = "step"
source = "memory"
logger = "quiet"

[step]
default_title = "Gearbox"
temp_dir = "/var/tmp"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.format, ModelFormat::Step);
    assert_eq!(settings.source, SourceKind::Memory);
    assert_eq!(settings.logger, LoggerKind::Quiet);
    assert_eq!(settings.step.default_title, "Gearbox");
    assert_eq!(
        settings.step.temp_dir.as_deref(),
        Some(std::path::Path::new("/var/tmp"))
    );
}

#[test]
fn given_partial_config_file_when_load_then_keeps_other_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.toml");
    fs::write(&path, "format = \"records\"\n").unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.format, ModelFormat::Records);
    assert_eq!(settings.source, SourceKind::File);
    assert_eq!(settings.step.default_title, "STEP Model");
    assert_eq!(settings.step.temp_dir, None);
}

#[test]
fn given_missing_config_file_when_load_then_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    // Act
    let result = Settings::load(Some(&path));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_unknown_format_in_file_when_load_then_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "format = \"iges\"\n").unwrap();

    // Act
    let result = Settings::load(Some(&path));

    // Assert
    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains("bad.toml")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn given_loaded_settings_when_serialized_then_round_trips_through_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.format = ModelFormat::Records;
    settings.step.default_title = "Imported".to_string();
    let path = dir.path().join("written.toml");
    fs::write(&path, settings.to_toml().unwrap()).unwrap();

    // Act
    let loaded = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(loaded.format, ModelFormat::Records);
    assert_eq!(loaded.step.default_title, "Imported");
}

#[test]
fn given_template_when_loaded_as_file_then_equals_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("template.toml");
    fs::write(&path, Settings::template()).unwrap();

    // Act
    let loaded = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(loaded, Settings::default());
}
