//! Value-first type inference for raw deployment variable values.
//!
//! Responsibilities:
//! - Classify a raw string as DateTime, Boolean, Number, String or Null.
//!
//! Does NOT handle:
//! - Time zone conversion (see `timezone`).
//! - Name sanitization (see `names`).
//!
//! Invariants:
//! - Inference is total: every input yields exactly one variant.
//! - The first matching rule wins: date/time, `True`/`False`, `Yes`/`No`,
//!   number, then string. Keyword matches ignore case.
//! - A candidate whose conversion fails (a number that overflows to an
//!   infinity) falls through to the next rule.
//! - The variable name never changes the result.

mod datetime;

use std::sync::LazyLock;

use osdinfo_config::DateCulture;
use regex::Regex;

use crate::value::{TypeTag, TypedValue};

pub use datetime::parse_datetime;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
        .expect("pattern is a compile-time constant with valid syntax")
});

/// Classifies raw values.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeInferenceEngine {
    culture: DateCulture,
}

impl TypeInferenceEngine {
    pub fn new(culture: DateCulture) -> Self {
        Self { culture }
    }

    pub fn culture(&self) -> DateCulture {
        self.culture
    }

    /// Infer the typed value of `raw`.
    ///
    /// `name_hint` is only used for diagnostics.
    pub fn infer(&self, raw: Option<&str>, name_hint: &str) -> (TypedValue, TypeTag) {
        let value = self.classify(raw);
        let tag = value.tag();
        tracing::trace!(name = %name_hint, tag = %tag, "Inferred value type");
        (value, tag)
    }

    fn classify(&self, raw: Option<&str>) -> TypedValue {
        let Some(raw) = raw else {
            return TypedValue::Null;
        };
        if raw.is_empty() {
            return TypedValue::Null;
        }

        if let Some(timestamp) = parse_datetime(raw, self.culture) {
            return TypedValue::DateTime(timestamp);
        }

        let trimmed = raw.trim();
        if let Some(flag) = parse_boolean(trimmed) {
            return TypedValue::Boolean(flag);
        }

        if let Some(number) = parse_number(trimmed) {
            return TypedValue::Number(number);
        }

        TypedValue::String(raw.to_string())
    }
}

fn parse_boolean(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

fn parse_number(value: &str) -> Option<f64> {
    if !NUMBER_RE.is_match(value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}
