//! Config file tests for the configuration loader builder.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serial_test::serial;
use tempfile::TempDir;

use super::env_lock;
use crate::loader::builder::ConfigLoader;
use crate::loader::error::ConfigError;

/// Writes a config file with a Central-time destination zone and a custom prefix.
pub fn create_test_config_file(dir: &Path) -> PathBuf {
    let path = dir.join("config.json");
    std::fs::write(
        &path,
        r#"{
            "Registry": true,
            "RegistryKeyPath": "HKLM\\SOFTWARE\\Contoso\\OSDInfo",
            "WMI": false,
            "ClassName": "Contoso_OSD",
            "OSDVariablePrefix": "CTS_",
            "DestinationTimeZoneID": "Central Standard Time",
            "ContinueOnError": true
        }"#,
    )
    .unwrap();
    path
}

#[test]
fn test_file_values_applied() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config_file(temp_dir.path());

    let config = ConfigLoader::new()
        .with_config_path(config_path)
        .from_file()
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.registry.key_path, r"HKLM\SOFTWARE\Contoso\OSDInfo");
    assert!(!config.wmi.enabled);
    assert_eq!(config.wmi.class_name, "Contoso_OSD");
    assert_eq!(config.collection.variable_prefix, "CTS_");
    assert_eq!(config.time_zones.destination.tz(), Tz::America__Chicago);
    assert!(config.continue_on_error);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let _lock = env_lock().lock().unwrap();
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config_file(temp_dir.path());

    temp_env::with_vars([("OSDINFO_CLASS_NAME", Some("EnvClass"))], || {
        let config = ConfigLoader::new()
            .with_config_path(config_path.clone())
            .from_file()
            .unwrap()
            .from_env()
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.wmi.class_name, "EnvClass");
        assert_eq!(config.collection.variable_prefix, "CTS_");
    });
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::new()
        .with_config_path(temp_dir.path().join("absent.json"))
        .from_file();

    assert!(matches!(result, Err(ConfigError::ConfigFileRead { .. })));
}

#[test]
fn test_malformed_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, r#"{ "Registry": "definitely" }"#).unwrap();

    let result = ConfigLoader::new().with_config_path(path).from_file();
    assert!(matches!(result, Err(ConfigError::ConfigFileParse { .. })));
}
