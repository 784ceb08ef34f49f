//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Apply command-line overrides on top of a `ConfigLoader`.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not open sources or stores (see `context` module).

use clap::{Parser, Subcommand, ValueEnum};
use osdinfo_config::ConfigLoader;
use std::path::PathBuf;

#[cfg(windows)]
const DEFAULT_BACKEND: &str = "native";
#[cfg(not(windows))]
const DEFAULT_BACKEND: &str = "local";

#[derive(Parser)]
#[command(name = "osdinfo")]
#[command(
    about = "Record operating system deployment information into the registry and WMI",
    long_about = None
)]
#[command(version)]
#[command(
    after_help = concat!(
        "Examples:\n",
        "  osdinfo record\n",
        "  osdinfo collect --output json\n",
        "  osdinfo --source-file ts-env.json --store-backend local record\n",
        "  osdinfo schema --output-file OSDInfo.mof\n",
    )
)]
pub struct Cli {
    /// Path to a custom configuration file (overrides default location).
    ///
    /// Can also be set via OSDINFO_CONFIG_PATH environment variable.
    #[arg(long, global = true, env = "OSDINFO_CONFIG_PATH", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Where deployment variables are read from
    #[arg(long, global = true, value_enum, default_value_t = SourceKind::Env)]
    pub source: SourceKind,

    /// JSON export of the deployment environment (implies `--source file`)
    #[arg(long, global = true, value_name = "FILE")]
    pub source_file: Option<PathBuf>,

    /// Store implementation: `native` uses reg.exe, mofcomp and CIM; `local` uses JSON files
    #[arg(long, global = true, value_enum, default_value = DEFAULT_BACKEND)]
    pub store_backend: StoreBackend,

    /// Directory holding the JSON files of the local store backend
    #[arg(long, global = true, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Do not write values to the registry
    #[arg(long, global = true)]
    pub no_registry: bool,

    /// Do not synthesize and publish the WMI class
    #[arg(long, global = true)]
    pub no_wmi: bool,

    /// Registry key that receives one value per entry
    #[arg(long, global = true, value_name = "KEY")]
    pub registry_key_path: Option<String>,

    /// WMI namespace the class is created in
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// WMI class name
    #[arg(long, global = true)]
    pub class_name: Option<String>,

    /// Description qualifier of the WMI class
    #[arg(long, global = true)]
    pub class_description: Option<String>,

    /// Prefix identifying custom variables (must end with `_`, `-` or `.`)
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Zone offset-less timestamps are read in (defaults to the host zone)
    #[arg(long, global = true, value_name = "ZONE")]
    pub source_time_zone: Option<String>,

    /// Zone timestamps are converted to first
    #[arg(long, global = true, value_name = "ZONE")]
    pub destination_time_zone: Option<String>,

    /// Zone timestamps are stored in
    #[arg(long, global = true, value_name = "ZONE")]
    pub final_time_zone: Option<String>,

    /// Date culture used to read ambiguous dates (invariant, en-US, en-GB, de-DE)
    #[arg(long, global = true, value_name = "CULTURE")]
    pub date_culture: Option<String>,

    /// Directory for the run log and the generated schema file
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Keep going after compile and store write failures
    #[arg(long, global = true)]
    pub continue_on_error: bool,

    /// Schema compiler binary used by the native backend
    #[arg(long, global = true, value_name = "FILE")]
    pub compiler_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Process environment
    Env,
    /// JSON export file
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// JSON files under the store directory
    Local,
    /// reg.exe, the schema compiler and PowerShell CIM cmdlets
    Native,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect deployment variables and write them to the enabled stores
    Record {
        /// Format of the run summary
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Print the typed entries without writing anything
    Collect {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Print the schema text synthesized from the collected entries
    Schema {
        /// Write the schema to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        output_file: Option<PathBuf>,
    },
}

impl Cli {
    /// Effective source kind; a source file always selects the file source.
    pub fn source_kind(&self) -> SourceKind {
        if self.source_file.is_some() {
            SourceKind::File
        } else {
            self.source
        }
    }

    /// Apply command-line overrides (highest priority) to `loader`.
    pub fn apply_overrides(&self, mut loader: ConfigLoader) -> ConfigLoader {
        if self.no_registry {
            loader = loader.with_registry_enabled(false);
        }
        if self.no_wmi {
            loader = loader.with_wmi_enabled(false);
        }
        if self.continue_on_error {
            loader = loader.with_continue_on_error(true);
        }
        if let Some(ref key_path) = self.registry_key_path {
            loader = loader.with_registry_key_path(key_path.clone());
        }
        if let Some(ref namespace) = self.namespace {
            loader = loader.with_namespace(namespace.clone());
        }
        if let Some(ref class_name) = self.class_name {
            loader = loader.with_class_name(class_name.clone());
        }
        if let Some(ref description) = self.class_description {
            loader = loader.with_class_description(description.clone());
        }
        if let Some(ref prefix) = self.prefix {
            loader = loader.with_variable_prefix(prefix.clone());
        }
        if let Some(ref zone) = self.source_time_zone {
            loader = loader.with_source_time_zone(zone.clone());
        }
        if let Some(ref zone) = self.destination_time_zone {
            loader = loader.with_destination_time_zone(zone.clone());
        }
        if let Some(ref zone) = self.final_time_zone {
            loader = loader.with_final_time_zone(zone.clone());
        }
        if let Some(ref culture) = self.date_culture {
            loader = loader.with_date_culture(culture.clone());
        }
        if let Some(ref dir) = self.log_dir {
            loader = loader.with_log_dir(dir.clone());
        }
        if let Some(ref path) = self.compiler_path {
            loader = loader.with_compiler_path(path.clone());
        }
        loader
    }
}
