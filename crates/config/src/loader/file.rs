//! JSON config file loading.
//!
//! Responsibilities:
//! - Locate the config file (explicit path, `OSDINFO_CONFIG_PATH`, or the platform default).
//! - Parse the file and apply its values to a `ConfigLoader`.
//!
//! Does NOT handle:
//! - Environment variable parsing (see env.rs).
//! - Validation of the merged values (see builder.rs).
//!
//! Invariants:
//! - File values are applied before environment variables (env vars take precedence).
//! - A missing file at the default location is not an error; a missing file at an
//!   explicitly configured path is.
//! - Keys use the documented option names (`Registry`, `RegistryKeyPath`, `WMI`, ...).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::builder::ConfigLoader;
use super::error::ConfigError;

/// On-disk representation of the config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct ConfigFile {
    pub registry: Option<bool>,
    pub registry_key_path: Option<String>,
    #[serde(rename = "WMI")]
    pub wmi: Option<bool>,
    pub namespace: Option<String>,
    pub class_name: Option<String>,
    pub class_description: Option<String>,
    #[serde(rename = "OSDVariablePrefix")]
    pub osd_variable_prefix: Option<String>,
    #[serde(rename = "SourceTimeZoneID")]
    pub source_time_zone_id: Option<String>,
    #[serde(rename = "DestinationTimeZoneID")]
    pub destination_time_zone_id: Option<String>,
    #[serde(rename = "FinalConversionTimeZoneID")]
    pub final_conversion_time_zone_id: Option<String>,
    pub date_culture: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub continue_on_error: Option<bool>,
    pub compiler_path: Option<PathBuf>,
}

/// Returns the default path to the configuration file.
///
/// - Linux/macOS: `~/.config/osdinfo/config.json`
/// - Windows: `%AppData%\osdinfo\config\config.json`
pub(crate) fn default_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = directories::ProjectDirs::from("", "", "osdinfo").ok_or_else(|| {
        ConfigError::ConfigDirUnavailable("no home directory for this user".to_string())
    })?;

    Ok(proj_dirs.config_dir().join("config.json"))
}

/// Reads and parses the config file from disk.
pub(crate) fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::ConfigFileParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Apply the config file (if any) to the loader.
pub(crate) fn apply_file(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    let (path, explicit) = match loader.config_path() {
        Some(path) => (path.clone(), true),
        None => match default_config_path() {
            Ok(path) => (path, false),
            Err(e) => {
                tracing::debug!(error = %e, "No default config location, skipping config file");
                return Ok(());
            }
        },
    };

    if !explicit && !path.exists() {
        tracing::debug!(path = %path.display(), "No config file at default location");
        return Ok(());
    }

    let file = read_config_file(&path)?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    apply_file_values(loader, file);
    Ok(())
}

fn apply_file_values(loader: &mut ConfigLoader, file: ConfigFile) {
    if let Some(enabled) = file.registry {
        loader.set_registry_enabled(Some(enabled));
    }
    if let Some(path) = file.registry_key_path {
        loader.set_registry_key_path(Some(path));
    }
    if let Some(enabled) = file.wmi {
        loader.set_wmi_enabled(Some(enabled));
    }
    if let Some(namespace) = file.namespace {
        loader.set_namespace(Some(namespace));
    }
    if let Some(class_name) = file.class_name {
        loader.set_class_name(Some(class_name));
    }
    if let Some(description) = file.class_description {
        loader.set_class_description(Some(description));
    }
    if let Some(prefix) = file.osd_variable_prefix {
        loader.set_variable_prefix(Some(prefix));
    }
    if let Some(zone) = file.source_time_zone_id {
        loader.set_source_time_zone(Some(zone));
    }
    if let Some(zone) = file.destination_time_zone_id {
        loader.set_destination_time_zone(Some(zone));
    }
    if let Some(zone) = file.final_conversion_time_zone_id {
        loader.set_final_time_zone(Some(zone));
    }
    if let Some(culture) = file.date_culture {
        loader.set_date_culture(Some(culture));
    }
    if let Some(dir) = file.log_dir {
        loader.set_log_dir(Some(dir));
    }
    if let Some(flag) = file.continue_on_error {
        loader.set_continue_on_error(Some(flag));
    }
    if let Some(path) = file.compiler_path {
        loader.set_compiler_path(Some(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_accepts_documented_keys() {
        let json = r#"{
            "Registry": false,
            "RegistryKeyPath": "HKLM\\SOFTWARE\\Contoso\\OSD",
            "WMI": true,
            "Namespace": "root\\cimv2\\Contoso",
            "ClassName": "Contoso_OSD",
            "ClassDescription": "Contoso deployment facts",
            "OSDVariablePrefix": "CTS_",
            "DestinationTimeZoneID": "Central Standard Time",
            "FinalConversionTimeZoneID": "UTC",
            "LogDir": "C:\\Windows\\Temp"
        }"#;

        let file: ConfigFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.registry, Some(false));
        assert_eq!(file.wmi, Some(true));
        assert_eq!(file.osd_variable_prefix.as_deref(), Some("CTS_"));
        assert_eq!(
            file.destination_time_zone_id.as_deref(),
            Some("Central Standard Time")
        );
        assert_eq!(file.log_dir, Some(PathBuf::from("C:\\Windows\\Temp")));
        assert!(file.source_time_zone_id.is_none());
    }

    #[test]
    fn test_config_file_rejects_unknown_keys() {
        let result = serde_json::from_str::<ConfigFile>(r#"{ "Regsitry": true }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_config_file_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_config_file(&path).unwrap_err();
        match err {
            ConfigError::ConfigFileParse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
