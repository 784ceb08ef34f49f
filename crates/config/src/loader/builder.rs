//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for hierarchical configuration merging.
//! - Support loading from config files, environment variables, and direct builder methods.
//! - Validate and normalize the merged values into the final `Config`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - Config file parsing (delegated to file.rs).
//!
//! Invariants / Assumptions:
//! - Environment variables take precedence over config file values.
//! - Builder methods take precedence over environment variables.
//! - Time zone identifiers are resolved here, so later stages never see an unknown zone.

use std::path::PathBuf;

use super::env::apply_env;
use super::error::ConfigError;
use super::file::apply_file;
use crate::constants::{
    DEFAULT_CLASS_DESCRIPTION, DEFAULT_CLASS_NAME, DEFAULT_COMPILER_PATH,
    DEFAULT_DESTINATION_TIME_ZONE, DEFAULT_FINAL_TIME_ZONE, DEFAULT_NAMESPACE,
    DEFAULT_REGISTRY_ENABLED, DEFAULT_REGISTRY_KEY_PATH, DEFAULT_VARIABLE_PREFIX,
    DEFAULT_WMI_ENABLED, PREFIX_SEPARATORS, REGISTRY_HIVES,
};
use crate::types::{
    CollectionConfig, Config, DateCulture, RegistryOutput, TimeZoneSettings, WmiOutput,
};
use crate::zones::{ZoneId, resolve_zone};

/// Configuration loader that builds config from files, environment variables and overrides.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    registry_enabled: Option<bool>,
    registry_key_path: Option<String>,
    wmi_enabled: Option<bool>,
    namespace: Option<String>,
    class_name: Option<String>,
    class_description: Option<String>,
    variable_prefix: Option<String>,
    source_time_zone: Option<String>,
    destination_time_zone: Option<String>,
    final_time_zone: Option<String>,
    date_culture: Option<String>,
    log_dir: Option<PathBuf>,
    continue_on_error: Option<bool>,
    compiler_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` is set to "true" or "1", the .env file is not loaded.
    /// Missing `.env` files are silently ignored.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Override the config file path.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Read configuration from the config file.
    ///
    /// Uses the explicit path when set, otherwise the platform default location
    /// (silently skipped when absent).
    pub fn from_file(mut self) -> Result<Self, ConfigError> {
        apply_file(&mut self)?;
        Ok(self)
    }

    /// Read configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    /// Enable or disable the hierarchical store output.
    pub fn with_registry_enabled(mut self, enabled: bool) -> Self {
        self.registry_enabled = Some(enabled);
        self
    }

    /// Set the registry key path.
    pub fn with_registry_key_path(mut self, path: String) -> Self {
        self.registry_key_path = Some(path);
        self
    }

    /// Enable or disable the structured store output.
    pub fn with_wmi_enabled(mut self, enabled: bool) -> Self {
        self.wmi_enabled = Some(enabled);
        self
    }

    /// Set the structured store namespace.
    pub fn with_namespace(mut self, namespace: String) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Set the structured store class name.
    pub fn with_class_name(mut self, class_name: String) -> Self {
        self.class_name = Some(class_name);
        self
    }

    /// Set the class description qualifier.
    pub fn with_class_description(mut self, description: String) -> Self {
        self.class_description = Some(description);
        self
    }

    /// Set the custom variable prefix.
    pub fn with_variable_prefix(mut self, prefix: String) -> Self {
        self.variable_prefix = Some(prefix);
        self
    }

    /// Set the zone offset-less timestamps are read in.
    pub fn with_source_time_zone(mut self, zone: String) -> Self {
        self.source_time_zone = Some(zone);
        self
    }

    /// Set the destination time zone.
    pub fn with_destination_time_zone(mut self, zone: String) -> Self {
        self.destination_time_zone = Some(zone);
        self
    }

    /// Set the final conversion time zone.
    pub fn with_final_time_zone(mut self, zone: String) -> Self {
        self.final_time_zone = Some(zone);
        self
    }

    /// Set the date culture name.
    pub fn with_date_culture(mut self, culture: String) -> Self {
        self.date_culture = Some(culture);
        self
    }

    /// Set the log directory.
    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = Some(dir);
        self
    }

    /// Set whether failures after collection are tolerated.
    pub fn with_continue_on_error(mut self, flag: bool) -> Self {
        self.continue_on_error = Some(flag);
        self
    }

    /// Set the schema compiler binary.
    pub fn with_compiler_path(mut self, path: PathBuf) -> Self {
        self.compiler_path = Some(path);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let registry = RegistryOutput {
            enabled: self.registry_enabled.unwrap_or(DEFAULT_REGISTRY_ENABLED),
            key_path: normalize_registry_path(
                self.registry_key_path
                    .as_deref()
                    .unwrap_or(DEFAULT_REGISTRY_KEY_PATH),
            )?,
        };

        let wmi = WmiOutput {
            enabled: self.wmi_enabled.unwrap_or(DEFAULT_WMI_ENABLED),
            namespace: normalize_namespace(
                self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE),
            )?,
            class_name: validate_class_name(
                self.class_name.as_deref().unwrap_or(DEFAULT_CLASS_NAME),
            )?,
            class_description: self
                .class_description
                .unwrap_or_else(|| DEFAULT_CLASS_DESCRIPTION.to_string()),
            compiler_path: self
                .compiler_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPILER_PATH)),
        };

        let culture = match self.date_culture.as_deref() {
            Some(name) => name
                .parse::<DateCulture>()
                .map_err(|message| ConfigError::InvalidValue {
                    var: "DateCulture".to_string(),
                    message,
                })?,
            None => DateCulture::default(),
        };

        let collection = CollectionConfig {
            variable_prefix: validate_prefix(
                self.variable_prefix
                    .as_deref()
                    .unwrap_or(DEFAULT_VARIABLE_PREFIX),
            )?,
            culture,
        };

        let time_zones = TimeZoneSettings {
            source: self
                .source_time_zone
                .as_deref()
                .map(|id| zone_for("SourceTimeZoneID", id))
                .transpose()?,
            destination: zone_for(
                "DestinationTimeZoneID",
                self.destination_time_zone
                    .as_deref()
                    .unwrap_or(DEFAULT_DESTINATION_TIME_ZONE),
            )?,
            final_zone: zone_for(
                "FinalConversionTimeZoneID",
                self.final_time_zone
                    .as_deref()
                    .unwrap_or(DEFAULT_FINAL_TIME_ZONE),
            )?,
        };

        Ok(Config {
            registry,
            wmi,
            collection,
            time_zones,
            log_dir: self.log_dir,
            continue_on_error: self.continue_on_error.unwrap_or(false),
        })
    }

    // Internal accessor methods for use by other loader modules

    pub(crate) fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub(crate) fn set_config_path(&mut self, path: Option<PathBuf>) {
        self.config_path = path;
    }

    pub(crate) fn set_registry_enabled(&mut self, enabled: Option<bool>) {
        self.registry_enabled = enabled;
    }

    pub(crate) fn set_registry_key_path(&mut self, path: Option<String>) {
        self.registry_key_path = path;
    }

    pub(crate) fn set_wmi_enabled(&mut self, enabled: Option<bool>) {
        self.wmi_enabled = enabled;
    }

    pub(crate) fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace;
    }

    pub(crate) fn set_class_name(&mut self, class_name: Option<String>) {
        self.class_name = class_name;
    }

    pub(crate) fn set_class_description(&mut self, description: Option<String>) {
        self.class_description = description;
    }

    pub(crate) fn set_variable_prefix(&mut self, prefix: Option<String>) {
        self.variable_prefix = prefix;
    }

    pub(crate) fn set_source_time_zone(&mut self, zone: Option<String>) {
        self.source_time_zone = zone;
    }

    pub(crate) fn set_destination_time_zone(&mut self, zone: Option<String>) {
        self.destination_time_zone = zone;
    }

    pub(crate) fn set_final_time_zone(&mut self, zone: Option<String>) {
        self.final_time_zone = zone;
    }

    pub(crate) fn set_date_culture(&mut self, culture: Option<String>) {
        self.date_culture = culture;
    }

    pub(crate) fn set_log_dir(&mut self, dir: Option<PathBuf>) {
        self.log_dir = dir;
    }

    pub(crate) fn set_continue_on_error(&mut self, flag: Option<bool>) {
        self.continue_on_error = flag;
    }

    pub(crate) fn set_compiler_path(&mut self, path: Option<PathBuf>) {
        self.compiler_path = path;
    }
}

fn zone_for(var: &str, id: &str) -> Result<ZoneId, ConfigError> {
    resolve_zone(id).map_err(|_| ConfigError::InvalidTimeZone {
        var: var.to_string(),
        id: id.to_string(),
    })
}

/// Validates the custom variable prefix.
///
/// The prefix must be non-empty and end with a separator so that stripping it
/// never leaves a name glued to a partial word.
fn validate_prefix(prefix: &str) -> Result<String, ConfigError> {
    let valid = prefix
        .chars()
        .last()
        .is_some_and(|last| PREFIX_SEPARATORS.contains(&last))
        && prefix.len() > 1
        && !prefix.chars().any(char::is_whitespace);

    if valid {
        Ok(prefix.to_string())
    } else {
        Err(ConfigError::InvalidVariablePrefix {
            prefix: prefix.to_string(),
        })
    }
}

/// Validates and normalizes a registry key path.
///
/// Normalization rules:
/// - Trim surrounding whitespace
/// - Accept `/` as a separator and PowerShell drive syntax (`HKLM:\...`)
/// - Strip trailing separators
/// - Require a known hive and at least one subkey
fn normalize_registry_path(raw: &str) -> Result<String, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidRegistryPath {
        path: raw.to_string(),
        message: message.to_string(),
    };

    let unified = raw.trim().replace('/', "\\");
    let segments: Vec<&str> = unified.split('\\').filter(|s| !s.is_empty()).collect();

    let Some((hive, subkeys)) = segments.split_first() else {
        return Err(invalid("path is empty"));
    };

    let hive = hive.trim_end_matches(':');
    let Some(known) = REGISTRY_HIVES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(hive))
    else {
        return Err(invalid("must start with a registry hive such as HKLM"));
    };

    if subkeys.is_empty() {
        return Err(invalid("writing directly under a hive is not allowed"));
    }

    let mut normalized = known.to_string();
    for subkey in subkeys {
        normalized.push('\\');
        normalized.push_str(subkey);
    }
    Ok(normalized)
}

/// Validates and normalizes a structured store namespace.
///
/// The namespace must start at `root` and every segment must be an identifier.
fn normalize_namespace(raw: &str) -> Result<String, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidNamespace {
        namespace: raw.to_string(),
        message: message.to_string(),
    };

    let unified = raw.trim().replace('/', "\\");
    let segments: Vec<&str> = unified.split('\\').filter(|s| !s.is_empty()).collect();

    match segments.first() {
        Some(first) if first.eq_ignore_ascii_case("root") => {}
        Some(_) => return Err(invalid("must start with 'root'")),
        None => return Err(invalid("namespace is empty")),
    }

    if let Some(bad) = segments.iter().find(|s| !is_identifier(s)) {
        return Err(invalid(&format!(
            "segment '{bad}' must contain only letters, digits and underscores"
        )));
    }

    Ok(segments.join("\\"))
}

/// Validates a class name: an identifier that is not a system (`__`) class.
fn validate_class_name(raw: &str) -> Result<String, ConfigError> {
    let name = raw.trim();
    if !is_identifier(name) {
        return Err(ConfigError::InvalidClassName {
            class_name: raw.to_string(),
            message: "must start with a letter and contain only letters, digits and underscores"
                .to_string(),
        });
    }
    if name.starts_with("__") {
        return Err(ConfigError::InvalidClassName {
            class_name: raw.to_string(),
            message: "names starting with '__' are reserved for system classes".to_string(),
        });
    }
    Ok(name.to_string())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_registry_path_variants() {
        assert_eq!(
            normalize_registry_path(r"HKLM:\SOFTWARE\OSDInfo\").unwrap(),
            r"HKLM\SOFTWARE\OSDInfo"
        );
        assert_eq!(
            normalize_registry_path("hkey_local_machine/SOFTWARE/OSDInfo").unwrap(),
            r"HKEY_LOCAL_MACHINE\SOFTWARE\OSDInfo"
        );
        assert!(normalize_registry_path("HKLM").is_err());
        assert!(normalize_registry_path(r"SOFTWARE\OSDInfo").is_err());
        assert!(normalize_registry_path("  ").is_err());
    }

    #[test]
    fn test_normalize_namespace_variants() {
        assert_eq!(normalize_namespace("root/cimv2").unwrap(), r"root\cimv2");
        assert_eq!(
            normalize_namespace(r"ROOT\cimv2\OSDInfo\").unwrap(),
            r"ROOT\cimv2\OSDInfo"
        );
        assert!(normalize_namespace(r"cimv2\OSDInfo").is_err());
        assert!(normalize_namespace(r"root\my space").is_err());
    }

    #[test]
    fn test_validate_class_name() {
        assert_eq!(validate_class_name(" OSDInfo ").unwrap(), "OSDInfo");
        assert!(validate_class_name("Contoso_OSD2").is_ok());
        assert!(validate_class_name("2Fast").is_err());
        assert!(validate_class_name("__Namespace").is_err());
        assert!(validate_class_name("OSD-Info").is_err());
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("XOSDInfo_").is_ok());
        assert!(validate_prefix("CTS-").is_ok());
        assert!(validate_prefix("CTS.").is_ok());
        assert!(validate_prefix("CTS").is_err());
        assert!(validate_prefix("_").is_err());
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("My Prefix_").is_err());
    }
}
