//! Configuration management for OSDInfo.
//!
//! This crate provides the configuration types and the loader that merges a
//! JSON config file, `OSDINFO_*` environment variables and explicit overrides
//! into one validated [`Config`].

pub mod constants;
mod loader;
pub mod types;
pub mod zones;

pub use loader::{ConfigError, ConfigLoader, env_var_or_none};
pub use types::{
    CollectionConfig, Config, DateCulture, RegistryOutput, TimeZoneSettings, WmiOutput,
};
pub use zones::{ZoneId, resolve_zone};
