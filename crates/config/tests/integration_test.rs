//! Integration tests for the public configuration API.
//!
//! Responsibilities:
//! - Exercise `ConfigLoader` through the crate's public surface only.
//! - Verify file < env < builder precedence end to end.

use std::path::PathBuf;

use osdinfo_config::{ConfigError, ConfigLoader, DateCulture, resolve_zone};
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_full_precedence_chain() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("osdinfo.json");
    std::fs::write(
        &path,
        r#"{
            "Namespace": "root\\FromFile",
            "ClassName": "FromFile",
            "OSDVariablePrefix": "FILE_",
            "DateCulture": "en-GB"
        }"#,
    )
    .unwrap();

    temp_env::with_vars(
        [
            ("OSDINFO_CLASS_NAME", Some("FromEnv")),
            ("OSDINFO_VARIABLE_PREFIX", Some("ENV_")),
        ],
        || {
            let config = ConfigLoader::new()
                .with_config_path(path.clone())
                .from_file()
                .unwrap()
                .from_env()
                .unwrap()
                .with_variable_prefix("CLI_".to_string())
                .build()
                .unwrap();

            assert_eq!(config.wmi.namespace, r"root\FromFile");
            assert_eq!(config.wmi.class_name, "FromEnv");
            assert_eq!(config.collection.variable_prefix, "CLI_");
            assert_eq!(config.collection.culture, DateCulture::EnGb);
        },
    );
}

#[test]
fn test_log_dir_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("osdinfo.json");
    std::fs::write(&path, r#"{ "LogDir": "/var/log/osdinfo" }"#).unwrap();

    let config = ConfigLoader::new()
        .with_config_path(path)
        .from_file()
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/osdinfo")));
}

#[test]
fn test_config_error_is_displayable() {
    let err = ConfigLoader::new()
        .with_variable_prefix("NoSeparator".to_string())
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidVariablePrefix { .. }));
    assert!(err.to_string().contains("NoSeparator"));
}

#[test]
fn test_public_zone_resolution() {
    let zone = resolve_zone("Tokyo Standard Time").unwrap();
    assert_eq!(zone.tz().name(), "Asia/Tokyo");
}
