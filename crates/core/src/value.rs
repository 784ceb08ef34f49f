//! Typed values and entries produced by collection.
//!
//! Invariants:
//! - A `TypedEntry` name contains ASCII letters and digits only.
//! - `TypedValue::Number` never holds NaN or an infinity.
//! - A `Timestamp` that has been through the normalizer is always `Fixed`.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Timelike};
use serde::{Serialize, Serializer};

/// The semantic type inferred for a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeTag {
    DateTime,
    Boolean,
    Number,
    String,
    Null,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::DateTime => "DateTime",
            TypeTag::Boolean => "Boolean",
            TypeTag::Number => "Number",
            TypeTag::String => "String",
            TypeTag::Null => "Null",
        };
        f.write_str(name)
    }
}

/// A point in time, with or without a known offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Wall-clock time with no zone information ("source local").
    Floating(NaiveDateTime),
    /// Time with a known UTC offset.
    Fixed(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Wall-clock time without the offset.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Timestamp::Floating(naive) => *naive,
            Timestamp::Fixed(dt) => dt.naive_local(),
        }
    }

    /// Offset from UTC in seconds; floating timestamps report zero.
    pub fn offset_seconds(&self) -> i32 {
        match self {
            Timestamp::Floating(_) => 0,
            Timestamp::Fixed(dt) => dt.offset().fix().local_minus_utc(),
        }
    }

    /// Seconds elapsed from `earlier` to `self`.
    ///
    /// Floating timestamps are compared as wall-clock times.
    pub fn seconds_since(&self, earlier: &Timestamp) -> f64 {
        let delta = match (self, earlier) {
            (Timestamp::Fixed(a), Timestamp::Fixed(b)) => a.signed_duration_since(*b),
            _ => self.naive_local().signed_duration_since(earlier.naive_local()),
        };
        delta.num_milliseconds() as f64 / 1000.0
    }

    /// CIM DMTF datetime form: `yyyymmddHHMMSS.mmmmmm+UUU`.
    pub fn to_cim(&self) -> String {
        let naive = self.naive_local();
        let minutes = self.offset_seconds() / 60;
        let sign = if minutes < 0 { '-' } else { '+' };
        format!(
            "{}.{:06}{}{:03}",
            naive.format("%Y%m%d%H%M%S"),
            naive.nanosecond() / 1_000,
            sign,
            minutes.abs()
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Floating(naive) => write!(f, "{}", naive.format("%Y-%m-%d %H:%M:%S%.f")),
            Timestamp::Fixed(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f %:z")),
        }
    }
}

/// A converted value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    DateTime(Timestamp),
    Boolean(bool),
    Number(f64),
    String(String),
    Null,
}

impl TypedValue {
    /// The type tag of this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            TypedValue::DateTime(_) => TypeTag::DateTime,
            TypedValue::Boolean(_) => TypeTag::Boolean,
            TypedValue::Number(_) => TypeTag::Number,
            TypedValue::String(_) => TypeTag::String,
            TypedValue::Null => TypeTag::Null,
        }
    }

    /// String projection written to the hierarchical store.
    ///
    /// Booleans render as `True`/`False`, Null renders as the empty string.
    pub fn display_string(&self) -> String {
        match self {
            TypedValue::DateTime(ts) => ts.to_string(),
            TypedValue::Boolean(true) => "True".to_string(),
            TypedValue::Boolean(false) => "False".to_string(),
            TypedValue::Number(n) => n.to_string(),
            TypedValue::String(s) => s.clone(),
            TypedValue::Null => String::new(),
        }
    }
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedValue::DateTime(Timestamp::Fixed(dt)) => {
                serializer.serialize_str(&dt.to_rfc3339())
            }
            TypedValue::DateTime(Timestamp::Floating(naive)) => {
                serializer.serialize_str(&naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            TypedValue::Boolean(b) => serializer.serialize_bool(*b),
            TypedValue::Number(n) => serializer.serialize_f64(*n),
            TypedValue::String(s) => serializer.serialize_str(s),
            TypedValue::Null => serializer.serialize_none(),
        }
    }
}

/// One named, typed fact about the deployment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedEntry {
    name: String,
    value: TypedValue,
    raw: String,
}

impl TypedEntry {
    /// Create an entry. `name` must already be sanitized.
    pub fn new(name: impl Into<String>, value: TypedValue, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            raw: raw.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &TypedValue {
        &self.value
    }

    /// The raw string the value was inferred from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tag(&self) -> TypeTag {
        self.value.tag()
    }
}
