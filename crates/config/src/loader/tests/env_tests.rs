//! Environment variable tests for the configuration loader builder.

use std::path::PathBuf;

use chrono_tz::Tz;
use serial_test::serial;

use super::env_lock;
use crate::loader::builder::ConfigLoader;
use crate::loader::error::ConfigError;

#[test]
#[serial]
fn test_env_values_applied() {
    let _lock = env_lock().lock().unwrap();

    temp_env::with_vars(
        [
            ("OSDINFO_REGISTRY", Some("false")),
            ("OSDINFO_REGISTRY_KEY_PATH", Some(r"HKLM\SOFTWARE\Fabrikam")),
            ("OSDINFO_WMI", Some("yes")),
            ("OSDINFO_NAMESPACE", Some(r"root\Fabrikam")),
            ("OSDINFO_CLASS_NAME", Some("Fabrikam_OSD")),
            ("OSDINFO_VARIABLE_PREFIX", Some("FAB_")),
            ("OSDINFO_DESTINATION_TIME_ZONE", Some("Pacific Standard Time")),
            ("OSDINFO_FINAL_TIME_ZONE", Some("UTC")),
            ("OSDINFO_DATE_CULTURE", Some("de-DE")),
            ("OSDINFO_LOG_DIR", Some("/tmp/osd-logs")),
            ("OSDINFO_CONTINUE_ON_ERROR", Some("1")),
        ],
        || {
            let config = ConfigLoader::new().from_env().unwrap().build().unwrap();

            assert!(!config.registry.enabled);
            assert_eq!(config.registry.key_path, r"HKLM\SOFTWARE\Fabrikam");
            assert!(config.wmi.enabled);
            assert_eq!(config.wmi.namespace, r"root\Fabrikam");
            assert_eq!(config.wmi.class_name, "Fabrikam_OSD");
            assert_eq!(config.collection.variable_prefix, "FAB_");
            assert_eq!(
                config.time_zones.destination.tz(),
                Tz::America__Los_Angeles
            );
            assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/osd-logs")));
            assert!(config.continue_on_error);
        },
    );
}

#[test]
#[serial]
fn test_builder_overrides_env() {
    let _lock = env_lock().lock().unwrap();

    temp_env::with_vars([("OSDINFO_CLASS_NAME", Some("FromEnv"))], || {
        let config = ConfigLoader::new()
            .from_env()
            .unwrap()
            .with_class_name("FromCli".to_string())
            .build()
            .unwrap();
        assert_eq!(config.wmi.class_name, "FromCli");
    });
}

#[test]
#[serial]
fn test_empty_env_vars_ignored() {
    let _lock = env_lock().lock().unwrap();

    temp_env::with_vars(
        [
            ("OSDINFO_CLASS_NAME", Some("")),
            ("OSDINFO_NAMESPACE", Some("   ")),
            ("OSDINFO_VARIABLE_PREFIX", Some("  ")),
        ],
        || {
            let config = ConfigLoader::new().from_env().unwrap().build().unwrap();
            assert_eq!(config.wmi.class_name, "OSDInfo");
            assert_eq!(config.wmi.namespace, r"root\cimv2");
            assert_eq!(config.collection.variable_prefix, "XOSDInfo_");
        },
    );
}

#[test]
#[serial]
fn test_invalid_boolean_env_var() {
    let _lock = env_lock().lock().unwrap();

    temp_env::with_vars([("OSDINFO_REGISTRY", Some("sometimes"))], || {
        let result = ConfigLoader::new().from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref var, .. }) if var == "OSDINFO_REGISTRY"
        ));
    });
}

#[test]
#[serial]
fn test_config_path_env_does_not_override_explicit_path() {
    let _lock = env_lock().lock().unwrap();

    temp_env::with_vars([("OSDINFO_CONFIG_PATH", Some("/from/env.json"))], || {
        let loader = ConfigLoader::new()
            .with_config_path(PathBuf::from("/from/cli.json"))
            .from_env()
            .unwrap();
        assert_eq!(loader.config_path(), Some(&PathBuf::from("/from/cli.json")));

        let loader = ConfigLoader::new().from_env().unwrap();
        assert_eq!(loader.config_path(), Some(&PathBuf::from("/from/env.json")));
    });
}
