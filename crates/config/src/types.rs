//! Configuration types for OSDInfo.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::zones::ZoneId;

/// Date/time pattern family used when inferring DateTime values.
///
/// ISO-8601, RFC-3339 and RFC-2822 forms are accepted under every culture;
/// the culture only decides how ambiguous numeric forms are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateCulture {
    /// Culture-neutral patterns (`MM/dd/yyyy HH:mm:ss`).
    #[serde(rename = "invariant")]
    Invariant,
    /// Month-first with 12-hour clock.
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    /// Day-first with 24-hour clock.
    #[serde(rename = "en-GB")]
    EnGb,
    /// Dotted day-first with 24-hour clock.
    #[serde(rename = "de-DE")]
    DeDe,
}

impl DateCulture {
    /// Culture name as used in configuration.
    pub fn name(self) -> &'static str {
        match self {
            DateCulture::Invariant => "invariant",
            DateCulture::EnUs => "en-US",
            DateCulture::EnGb => "en-GB",
            DateCulture::DeDe => "de-DE",
        }
    }
}

impl fmt::Display for DateCulture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DateCulture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invariant" | "" => Ok(DateCulture::Invariant),
            "en-us" => Ok(DateCulture::EnUs),
            "en-gb" => Ok(DateCulture::EnGb),
            "de-de" => Ok(DateCulture::DeDe),
            other => Err(format!(
                "unsupported culture '{other}' (expected invariant, en-US, en-GB or de-DE)"
            )),
        }
    }
}

/// Hierarchical (registry-like) store output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOutput {
    /// Whether entries are written to the hierarchical store.
    pub enabled: bool,
    /// Normalized key path (`HKLM\SOFTWARE\OSDInfo`), no trailing separator.
    pub key_path: String,
}

/// Structured (WMI-like) store output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmiOutput {
    /// Whether a schema is synthesized, compiled and populated.
    pub enabled: bool,
    /// Normalized namespace (`root\cimv2\OSDInfo`).
    pub namespace: String,
    /// Class that is deleted and recreated on every run.
    pub class_name: String,
    /// Description qualifier attached to the class.
    pub class_description: String,
    /// Schema compiler binary.
    pub compiler_path: PathBuf,
}

/// Variable collection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionConfig {
    /// Prefix identifying custom variables; always ends with a separator.
    pub variable_prefix: String,
    /// Pattern family for DateTime inference.
    pub culture: DateCulture,
}

/// Zones used by the two-stage timestamp normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZoneSettings {
    /// Zone offset-less timestamps are read in; `None` means the host zone.
    pub source: Option<ZoneId>,
    /// Intermediate zone a technician reads times in.
    pub destination: ZoneId,
    /// Zone timestamps are stored in.
    pub final_zone: ZoneId,
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub registry: RegistryOutput,
    pub wmi: WmiOutput,
    pub collection: CollectionConfig,
    pub time_zones: TimeZoneSettings,
    /// Directory for the run log and the generated schema file.
    pub log_dir: Option<PathBuf>,
    /// Keep going after compile failures and store write failures.
    pub continue_on_error: bool,
}

impl Config {
    /// True when at least one store receives output.
    pub fn has_output(&self) -> bool {
        self.registry.enabled || self.wmi.enabled
    }
}
