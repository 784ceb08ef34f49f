//! Centralized defaults for the OSDInfo workspace.
//!
//! These mirror the values a deployment technician gets when no config file,
//! environment variable or command-line override is present.

// =============================================================================
// Hierarchical store (registry) defaults
// =============================================================================

/// Whether values are written to the registry-like store by default.
pub const DEFAULT_REGISTRY_ENABLED: bool = true;

/// Default key path that receives one string value per entry.
pub const DEFAULT_REGISTRY_KEY_PATH: &str = r"HKLM\SOFTWARE\OSDInfo";

/// Hive prefixes accepted at the start of a registry key path.
pub const REGISTRY_HIVES: &[&str] = &[
    "HKLM",
    "HKCU",
    "HKCR",
    "HKU",
    "HKCC",
    "HKEY_LOCAL_MACHINE",
    "HKEY_CURRENT_USER",
    "HKEY_CLASSES_ROOT",
    "HKEY_USERS",
    "HKEY_CURRENT_CONFIG",
];

// =============================================================================
// Structured store (WMI) defaults
// =============================================================================

/// Whether the structured-store schema is synthesized and published by default.
pub const DEFAULT_WMI_ENABLED: bool = true;

/// Default namespace the class is (re)created in.
pub const DEFAULT_NAMESPACE: &str = r"root\cimv2";

/// Default class name.
pub const DEFAULT_CLASS_NAME: &str = "OSDInfo";

/// Default class description qualifier.
pub const DEFAULT_CLASS_DESCRIPTION: &str = "Operating system deployment information";

/// Default schema compiler binary.
#[cfg(windows)]
pub const DEFAULT_COMPILER_PATH: &str = "mofcomp.exe";

/// Default schema compiler binary.
#[cfg(not(windows))]
pub const DEFAULT_COMPILER_PATH: &str = "mofcomp";

// =============================================================================
// Collection defaults
// =============================================================================

/// Default prefix identifying custom deployment variables.
pub const DEFAULT_VARIABLE_PREFIX: &str = "XOSDInfo_";

/// Characters a variable prefix may end with.
pub const PREFIX_SEPARATORS: &[char] = &['_', '-', '.'];

// =============================================================================
// Time zone defaults
// =============================================================================

/// Default zone timestamps are first converted into.
pub const DEFAULT_DESTINATION_TIME_ZONE: &str = "UTC";

/// Default zone timestamps are stored in.
pub const DEFAULT_FINAL_TIME_ZONE: &str = "UTC";
