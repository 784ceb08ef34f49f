//! Tests for the configuration loader builder.
//!
//! Responsibilities:
//! - Test builder defaults and overrides.
//! - Test config file loading and precedence.
//! - Test environment variable handling and precedence.
//! - Test validation of prefixes, zones, namespaces and paths.
//!
//! Invariants:
//! - Tests use `serial_test` to prevent environment variable pollution.
//! - Tests use `global_test_lock()` for additional synchronization.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::sync::Mutex;

pub mod env_tests;
pub mod file_tests;

/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}
