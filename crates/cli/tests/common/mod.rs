//! Shared test utilities for osdinfo integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Provide a deployment environment export and local store directory.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - Commands use the local JSON store backend so no Windows tooling is needed.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const OSDINFO_VARS: &[&str] = &[
    "OSDINFO_CONFIG_PATH",
    "OSDINFO_REGISTRY",
    "OSDINFO_REGISTRY_KEY_PATH",
    "OSDINFO_WMI",
    "OSDINFO_NAMESPACE",
    "OSDINFO_CLASS_NAME",
    "OSDINFO_CLASS_DESCRIPTION",
    "OSDINFO_VARIABLE_PREFIX",
    "OSDINFO_SOURCE_TIME_ZONE",
    "OSDINFO_DESTINATION_TIME_ZONE",
    "OSDINFO_FINAL_TIME_ZONE",
    "OSDINFO_DATE_CULTURE",
    "OSDINFO_LOG_DIR",
    "OSDINFO_CONTINUE_ON_ERROR",
    "OSDINFO_COMPILER_PATH",
];

/// Returns a hermetic `osdinfo` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - `OSDINFO_*` variables from the host are cleared.
pub fn osdinfo_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("osdinfo");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    for var in OSDINFO_VARS {
        cmd.env_remove(var);
    }

    cmd
}

/// A temporary deployment environment export plus local store directory.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// Create a fixture whose export contains `variables` (a JSON object).
    pub fn new(variables: serde_json::Value) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ts-env.json"),
            serde_json::to_string_pretty(&variables).unwrap(),
        )
        .unwrap();
        Self { dir }
    }

    /// A typical MDT deployment with a few custom variables.
    pub fn mdt() -> Self {
        Self::new(serde_json::json!({
            "Make": "Contoso",
            "Model": "Latitude 7420",
            "IsVM": "False",
            "TaskSequenceID": "WIN11",
            "XOSDInfo_Ring": "Pilot",
            "XOSDInfo_DiskGB": "476.9",
            "XOSDInfo_OSDStartTime": "2020-01-01T00:00:00",
            "XOSDInfo_OSDEndTime": "2020-01-01T01:30:00"
        }))
    }

    pub fn source_file(&self) -> PathBuf {
        self.dir.path().join("ts-env.json")
    }

    pub fn store_dir(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    /// Hermetic command reading this fixture and writing to the local stores.
    /// Time zones are pinned so results do not depend on the host zone.
    pub fn cmd(&self) -> Command {
        let mut cmd = osdinfo_cmd();
        cmd.arg("--source-file")
            .arg(self.source_file())
            .args(["--store-backend", "local", "--store-dir"])
            .arg(self.store_dir())
            .args(["--source-time-zone", "UTC"]);
        cmd
    }

    pub fn read_json(&self, path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    pub fn registry(&self) -> serde_json::Value {
        self.read_json(&self.store_dir().join("registry.json"))
    }

    pub fn wmi(&self) -> serde_json::Value {
        self.read_json(&self.store_dir().join("wmi.json"))
    }
}
