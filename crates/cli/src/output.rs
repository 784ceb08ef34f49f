//! Output rendering for CLI commands.
//!
//! Responsibilities:
//! - Render entry collections and run summaries as tab-separated tables or JSON.
//! - Write text to files atomically.
//!
//! Invariants:
//! - Table output has a header line and one line per row; an empty collection
//!   prints a single "No entries collected." line.
//! - Values never contain raw tabs or newlines in table output.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use osdinfo_core::EntryCollection;
use serde::Serialize;
use tempfile::NamedTempFile;

/// Outcome of a `record` run, printed as the summary.
#[derive(Debug, Default, Serialize)]
pub struct RecordSummary {
    pub collected: usize,
    pub registry_written: Option<usize>,
    pub wmi_assigned: Option<usize>,
    pub skipped: Vec<String>,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Serialize)]
pub struct FailureSummary {
    pub store: &'static str,
    pub name: String,
    pub error: String,
}

/// Tab-separated table of entries.
pub fn format_entries_table(entries: &EntryCollection) -> String {
    if entries.is_empty() {
        return "No entries collected.\n".to_string();
    }

    let mut output = String::from("Name\tType\tValue\n");
    for entry in entries {
        output.push_str(&format!(
            "{}\t{}\t{}\n",
            entry.name(),
            entry.tag(),
            escape_cell(&entry.value().display_string())
        ));
    }
    output
}

/// Pretty JSON object of entries keyed by name.
pub fn format_entries_json(entries: &EntryCollection) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(entries).context("Failed to serialize entries to JSON")?;
    json.push('\n');
    Ok(json)
}

/// Human-readable run summary.
pub fn format_summary_table(summary: &RecordSummary) -> String {
    let mut output = format!("Collected {} entries\n", summary.collected);
    match summary.registry_written {
        Some(count) => output.push_str(&format!("Registry: {count} values written\n")),
        None => output.push_str("Registry: skipped\n"),
    }
    match summary.wmi_assigned {
        Some(count) => output.push_str(&format!("WMI: {count} properties assigned\n")),
        None => output.push_str("WMI: skipped\n"),
    }
    if !summary.skipped.is_empty() {
        output.push_str(&format!(
            "Not on instance: {}\n",
            summary.skipped.join(", ")
        ));
    }
    if !summary.failures.is_empty() {
        output.push_str("Store\tName\tError\n");
        for failure in &summary.failures {
            output.push_str(&format!(
                "{}\t{}\t{}\n",
                failure.store,
                failure.name,
                escape_cell(&failure.error)
            ));
        }
    }
    output
}

pub fn format_summary_json(summary: &RecordSummary) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(summary).context("Failed to serialize summary to JSON")?;
    json.push('\n');
    Ok(json)
}

fn escape_cell(value: &str) -> String {
    value
        .replace('\t', "\\t")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

/// Write `content` to `path` through a temp file in the same directory.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent_dir)
        .with_context(|| format!("Failed to create directory: {}", parent_dir.display()))?;

    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .with_context(|| format!("Failed to create temp file in: {}", parent_dir.display()))?;

    temp_file
        .write_all(content.as_bytes())
        .with_context(|| "Failed to write to temp file")?;
    temp_file
        .flush()
        .with_context(|| "Failed to flush temp file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use osdinfo_core::{TypedEntry, TypedValue};

    fn entries() -> EntryCollection {
        [
            TypedEntry::new("IsVM", TypedValue::Boolean(false), "No"),
            TypedEntry::new("Notes", TypedValue::String("a\tb".to_string()), "a\tb"),
            TypedEntry::new("Ring", TypedValue::Null, ""),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_entries_table() {
        assert_eq!(
            format_entries_table(&entries()),
            "Name\tType\tValue\nIsVM\tBoolean\tFalse\nNotes\tString\ta\\tb\nRing\tNull\t\n"
        );
    }

    #[test]
    fn test_empty_entries_table() {
        assert_eq!(
            format_entries_table(&EntryCollection::new()),
            "No entries collected.\n"
        );
    }

    #[test]
    fn test_entries_json_is_keyed_by_name() {
        let json: serde_json::Value =
            serde_json::from_str(&format_entries_json(&entries()).unwrap()).unwrap();
        assert_eq!(json["IsVM"]["value"], serde_json::json!(false));
        assert_eq!(json["IsVM"]["raw"], serde_json::json!("No"));
        assert!(json["Ring"]["value"].is_null());
    }

    #[test]
    fn test_summary_table_lists_failures() {
        let summary = RecordSummary {
            collected: 3,
            registry_written: Some(2),
            wmi_assigned: None,
            skipped: vec!["Extra".to_string()],
            failures: vec![FailureSummary {
                store: "registry",
                name: "Ring".to_string(),
                error: "access denied".to_string(),
            }],
        };
        assert_eq!(
            format_summary_table(&summary),
            "Collected 3 entries\nRegistry: 2 values written\nWMI: skipped\n\
             Not on instance: Extra\nStore\tName\tError\nregistry\tRing\taccess denied\n"
        );
    }

    #[test]
    fn test_write_to_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("OSDInfo.mof");
        write_to_file("class X {};\n", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "class X {};\n");
    }
}
