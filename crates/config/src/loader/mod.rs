//! Configuration loader for files, environment variables and overrides.
//!
//! Responsibilities:
//! - Load configuration from `.env` files, `OSDINFO_*` environment variables and JSON config files.
//! - Provide a builder-pattern `ConfigLoader` for hierarchical configuration merging.
//! - Enforce the `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//!
//! Does NOT handle:
//! - Reading deployment variables (see `osdinfo_core::source`).
//!
//! Invariants / Assumptions:
//! - Builder overrides take precedence over environment variables, which take
//!   precedence over config file values.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.

mod builder;
mod env;
mod error;
mod file;

pub use builder::ConfigLoader;
pub use env::env_var_or_none;
pub use error::ConfigError;

#[cfg(test)]
mod tests;
