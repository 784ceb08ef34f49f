//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse `OSDINFO_*` environment variables.
//! - Apply environment variable values to a ConfigLoader instance.
//! - Provide a helper for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Loading from config files (see file.rs).
//! - Building the final Config (see builder.rs).
//!
//! Invariants:
//! - Environment variables take precedence over config file settings.
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid boolean values return ConfigError::InvalidValue.

use std::path::PathBuf;

use super::builder::ConfigLoader;
use super::error::ConfigError;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Parse the boolean spellings accepted by deployment tooling.
pub(crate) fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: "must be true or false".to_string(),
        }),
    }
}

/// Apply environment variable configuration to the loader.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if let Some(value) = env_var_or_none("OSDINFO_REGISTRY") {
        loader.set_registry_enabled(Some(parse_flag("OSDINFO_REGISTRY", &value)?));
    }
    if let Some(path) = env_var_or_none("OSDINFO_REGISTRY_KEY_PATH") {
        loader.set_registry_key_path(Some(path));
    }
    if let Some(value) = env_var_or_none("OSDINFO_WMI") {
        loader.set_wmi_enabled(Some(parse_flag("OSDINFO_WMI", &value)?));
    }
    if let Some(namespace) = env_var_or_none("OSDINFO_NAMESPACE") {
        loader.set_namespace(Some(namespace));
    }
    if let Some(class_name) = env_var_or_none("OSDINFO_CLASS_NAME") {
        loader.set_class_name(Some(class_name));
    }
    if let Some(description) = env_var_or_none("OSDINFO_CLASS_DESCRIPTION") {
        loader.set_class_description(Some(description));
    }
    // The prefix is not trimmed: a trailing separator is significant.
    if let Ok(prefix) = std::env::var("OSDINFO_VARIABLE_PREFIX")
        && !prefix.trim().is_empty()
    {
        loader.set_variable_prefix(Some(prefix));
    }
    if let Some(zone) = env_var_or_none("OSDINFO_SOURCE_TIME_ZONE") {
        loader.set_source_time_zone(Some(zone));
    }
    if let Some(zone) = env_var_or_none("OSDINFO_DESTINATION_TIME_ZONE") {
        loader.set_destination_time_zone(Some(zone));
    }
    if let Some(zone) = env_var_or_none("OSDINFO_FINAL_TIME_ZONE") {
        loader.set_final_time_zone(Some(zone));
    }
    if let Some(culture) = env_var_or_none("OSDINFO_DATE_CULTURE") {
        loader.set_date_culture(Some(culture));
    }
    if let Some(dir) = env_var_or_none("OSDINFO_LOG_DIR") {
        loader.set_log_dir(Some(PathBuf::from(dir)));
    }
    if let Some(value) = env_var_or_none("OSDINFO_CONTINUE_ON_ERROR") {
        loader.set_continue_on_error(Some(parse_flag("OSDINFO_CONTINUE_ON_ERROR", &value)?));
    }
    if let Some(path) = env_var_or_none("OSDINFO_COMPILER_PATH") {
        loader.set_compiler_path(Some(PathBuf::from(path)));
    }

    // Config path from environment (only if not already set via CLI)
    if loader.config_path().is_none()
        && let Some(config_path) = env_var_or_none("OSDINFO_CONFIG_PATH")
    {
        loader.set_config_path(Some(PathBuf::from(config_path)));
    }

    Ok(())
}
