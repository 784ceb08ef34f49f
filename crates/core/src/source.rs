//! Deployment environment sources.
//!
//! Responsibilities:
//! - Define the `VariableSource` seam the collector reads through.
//! - Provide an in-memory source, a process environment source, and a loader
//!   for JSON exports of a task sequence environment.
//!
//! Invariants:
//! - Lookups try the exact name first, then fall back to an ASCII
//!   case-insensitive match (the task sequence environment ignores case).
//! - `names()` returns every known name; order is not significant.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::SourceError;

/// A read-only view of deployment variables.
pub trait VariableSource {
    /// Every variable name known to the source.
    fn names(&self) -> Vec<String>;

    /// The raw value of `name`, or `None` when the variable does not exist.
    fn get(&self, name: &str) -> Option<String>;
}

/// In-memory variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSource {
    vars: BTreeMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (name, value) in iter {
            source.insert(name, value);
        }
        source
    }
}

impl VariableSource for MapSource {
    fn names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }

    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned().or_else(|| {
            self.vars
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone())
        })
    }
}

/// Variables of the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl VariableSource for EnvSource {
    fn names(&self) -> Vec<String> {
        std::env::vars_os()
            .filter_map(|(name, _)| name.into_string().ok())
            .collect()
    }

    /// Variables whose name or value is not valid Unicode are invisible.
    fn get(&self, name: &str) -> Option<String> {
        if let Some(value) = std::env::var_os(name).and_then(|v| v.into_string().ok()) {
            return Some(value);
        }
        std::env::vars_os()
            .filter_map(|(key, value)| {
                Some((key.into_string().ok()?, value.into_string().ok()?))
            })
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

/// Loader for JSON exports of the deployment environment.
///
/// The file holds one object mapping names to values. Strings are taken
/// as-is, numbers and booleans use their JSON text, `null` becomes the
/// empty string, and arrays are joined with `", "`.
pub struct JsonFileSource;

impl JsonFileSource {
    pub fn load(path: &Path) -> Result<MapSource, SourceError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SourceError::Unavailable {
                    path: path.to_path_buf(),
                }
            } else {
                SourceError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::parse(&content).map_err(|message| SourceError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse the content of an export.
    pub fn parse(content: &str) -> Result<MapSource, String> {
        let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
        let Value::Object(map) = value else {
            return Err("expected a JSON object of variable names to values".to_string());
        };

        let mut source = MapSource::new();
        for (name, value) in map {
            let raw = flatten(&value).ok_or_else(|| {
                format!("variable '{name}' has a nested object value")
            })?;
            source.insert(name, raw);
        }

        tracing::debug!(count = source.len(), "Loaded deployment variables from export");
        Ok(source)
    }
}

fn flatten(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .map(flatten)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(", ")),
        Value::Object(_) => None,
    }
}
