//! Variable collection: from raw deployment variables to typed entries.
//!
//! Responsibilities:
//! - Gather the default variables of the detected product and the computed
//!   names, then every custom variable carrying the configured prefix.
//! - Run each value through inference and time zone normalization.
//! - Append elapsed-time entries when a start and end time were recorded.
//!
//! Does NOT handle:
//! - Writing to any store (see `writer`).
//!
//! Invariants:
//! - A failure on one value skips that entry with a warning; collection
//!   itself never fails.
//! - Names absent from the source are skipped without a warning.
//! - Custom entries are applied after default entries, so a custom name that
//!   sanitizes to a default name overwrites its value but not its position.

use osdinfo_config::Config;
use tracing::{debug, info, warn};

use crate::defaults::{DeploymentProduct, computed_value};
use crate::entries::EntryCollection;
use crate::infer::TypeInferenceEngine;
use crate::names::{sanitize_name, sort_names, strip_prefix_ignore_case};
use crate::source::VariableSource;
use crate::timezone::TimezoneNormalizer;
use crate::value::{TypedEntry, TypedValue};

/// Custom variable holding the deployment start time.
pub const START_TIME_NAME: &str = "OSDStartTime";
/// Custom variable holding the deployment end time.
pub const END_TIME_NAME: &str = "OSDEndTime";

/// Turns a variable source into an ordered entry collection.
#[derive(Debug, Clone, Copy)]
pub struct VariableCollector {
    engine: TypeInferenceEngine,
    normalizer: TimezoneNormalizer,
}

impl VariableCollector {
    pub fn new(engine: TypeInferenceEngine, normalizer: TimezoneNormalizer) -> Self {
        Self { engine, normalizer }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TypeInferenceEngine::new(config.collection.culture),
            TimezoneNormalizer::from_config(&config.time_zones),
        )
    }

    /// Collect default and custom entries from `source`.
    ///
    /// A source without any variables yields an empty collection.
    pub fn collect(&self, source: &dyn VariableSource, prefix: &str) -> EntryCollection {
        if source.names().is_empty() {
            debug!("Deployment environment has no variables");
            return EntryCollection::new();
        }

        let product = DeploymentProduct::detect(source);
        debug!(product = %product, "Detected deployment product");

        let mut entries = self.collect_defaults(source, product);
        let default_count = entries.len();

        let custom = self.collect_custom(source, prefix);
        let custom_count = custom.len();
        entries.extend(custom);

        info!(
            product = %product,
            default_count,
            custom_count,
            total = entries.len(),
            "Collected deployment variables"
        );
        entries
    }

    fn collect_defaults(
        &self,
        source: &dyn VariableSource,
        product: DeploymentProduct,
    ) -> EntryCollection {
        let mut entries = EntryCollection::new();
        for name in product.default_names() {
            let sanitized = sanitize_name(&name);
            if sanitized.is_empty() {
                warn!(name = %name, "Variable name has no letters or digits; skipping");
                continue;
            }

            let Some(raw) = computed_value(&name, product, source).or_else(|| source.get(&name))
            else {
                continue;
            };

            if let Some(entry) = self.build_entry(&sanitized, raw) {
                entries.insert(entry);
            }
        }
        entries
    }

    fn collect_custom(&self, source: &dyn VariableSource, prefix: &str) -> EntryCollection {
        let mut names: Vec<String> = source
            .names()
            .into_iter()
            .filter(|name| strip_prefix_ignore_case(name, prefix).is_some())
            .collect();
        sort_names(&mut names);

        let mut entries = EntryCollection::new();
        for full_name in names {
            let Some(stripped) = strip_prefix_ignore_case(&full_name, prefix) else {
                continue;
            };
            let sanitized = sanitize_name(stripped);
            if sanitized.is_empty() {
                warn!(
                    name = %full_name,
                    "Custom variable name has no letters or digits after the prefix; skipping"
                );
                continue;
            }

            let Some(raw) = source.get(&full_name) else {
                continue;
            };

            if let Some(entry) = self.build_entry(&sanitized, raw)
                && let Some(replaced) = entries.insert(entry)
            {
                debug!(
                    name = %sanitized,
                    replaced = %replaced.raw(),
                    "Sanitized name collision, later value wins"
                );
            }
        }

        for entry in elapsed_entries(&entries) {
            entries.insert(entry);
        }
        entries
    }

    fn build_entry(&self, name: &str, raw: String) -> Option<TypedEntry> {
        let (value, _) = self.engine.infer(Some(&raw), name);
        let value = match value {
            TypedValue::DateTime(timestamp) => match self.normalizer.normalize(timestamp) {
                Ok(normalized) => TypedValue::DateTime(normalized),
                Err(e) => {
                    warn!(
                        name = %name,
                        raw = %raw,
                        error = %e,
                        "Failed to convert time; skipping entry"
                    );
                    return None;
                }
            },
            other => other,
        };
        Some(TypedEntry::new(name, value, raw))
    }
}

/// `OSDTotalSeconds`, `OSDTotalMinutes` and `OSDTotalHours` when both the
/// start and end time are DateTime entries.
fn elapsed_entries(entries: &EntryCollection) -> Vec<TypedEntry> {
    let (Some(start), Some(end)) = (entries.get(START_TIME_NAME), entries.get(END_TIME_NAME))
    else {
        return Vec::new();
    };
    let (TypedValue::DateTime(start), TypedValue::DateTime(end)) = (start.value(), end.value())
    else {
        debug!("Start or end time is not a date; elapsed time not computed");
        return Vec::new();
    };

    let seconds = end.seconds_since(start);
    [
        ("OSDTotalSeconds", seconds),
        ("OSDTotalMinutes", seconds / 60.0),
        ("OSDTotalHours", seconds / 3600.0),
    ]
    .into_iter()
    .map(|(name, amount)| {
        let rounded = round2(amount);
        TypedEntry::new(name, TypedValue::Number(rounded), rounded.to_string())
    })
    .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
