//! Multi-format date/time parsing.
//!
//! Responsibilities:
//! - Recognize offset-bearing forms (RFC 3339, RFC 2822, ISO with offset).
//! - Recognize offset-less ISO forms and the numeric forms of a culture.
//!
//! Invariants:
//! - Offset-bearing input yields `Timestamp::Fixed` with the input's offset.
//! - Offset-less input yields `Timestamp::Floating`.
//! - Years outside 1000..=9999 are rejected so that version strings such as
//!   `1.2.3` never read as dates and every result has a four-digit CIM form.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use osdinfo_config::DateCulture;

use crate::value::Timestamp;

/// Offset-bearing patterns accepted under every culture.
const OFFSET_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Offset-less date/time patterns accepted under every culture.
const ISO_DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only patterns accepted under every culture.
const ISO_DATE_PATTERNS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

struct CulturePatterns {
    datetimes: &'static [&'static str],
    dates: &'static [&'static str],
}

const INVARIANT: CulturePatterns = CulturePatterns {
    datetimes: &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"],
    dates: &["%m/%d/%Y", "%d %B %Y"],
};

const EN_US: CulturePatterns = CulturePatterns {
    datetimes: &[
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %I:%M %p",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%B %d, %Y %I:%M:%S %p",
        "%A, %B %d, %Y %I:%M:%S %p",
    ],
    dates: &["%m/%d/%Y", "%B %d, %Y", "%A, %B %d, %Y"],
};

const EN_GB: CulturePatterns = CulturePatterns {
    datetimes: &[
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d/%m/%Y %I:%M:%S %p",
        "%d %B %Y %H:%M:%S",
    ],
    dates: &["%d/%m/%Y", "%d %B %Y"],
};

const DE_DE: CulturePatterns = CulturePatterns {
    datetimes: &["%d.%m.%Y %H:%M:%S", "%d.%m.%Y %H:%M"],
    dates: &["%d.%m.%Y"],
};

fn culture_patterns(culture: DateCulture) -> &'static CulturePatterns {
    match culture {
        DateCulture::Invariant => &INVARIANT,
        DateCulture::EnUs => &EN_US,
        DateCulture::EnGb => &EN_GB,
        DateCulture::DeDe => &DE_DE,
    }
}

fn year_in_range(year: i32) -> bool {
    (1000..=9999).contains(&year)
}

fn parse_fixed(input: &str) -> Option<Timestamp> {
    let parsed = DateTime::parse_from_rfc3339(input)
        .ok()
        .or_else(|| DateTime::parse_from_rfc2822(input).ok())
        .or_else(|| {
            OFFSET_PATTERNS
                .iter()
                .find_map(|pattern| DateTime::parse_from_str(input, pattern).ok())
        })?;
    year_in_range(parsed.year()).then_some(Timestamp::Fixed(parsed))
}

fn parse_floating(input: &str, datetimes: &[&str], dates: &[&str]) -> Option<NaiveDateTime> {
    datetimes
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(input, pattern).ok())
        .or_else(|| {
            dates
                .iter()
                .find_map(|pattern| NaiveDate::parse_from_str(input, pattern).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parse `input` as a date/time under `culture`.
pub fn parse_datetime(input: &str, culture: DateCulture) -> Option<Timestamp> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(fixed) = parse_fixed(input) {
        return Some(fixed);
    }

    let patterns = culture_patterns(culture);
    let naive = parse_floating(input, ISO_DATETIME_PATTERNS, ISO_DATE_PATTERNS)
        .or_else(|| parse_floating(input, patterns.datetimes, patterns.dates))?;

    year_in_range(naive.year()).then_some(Timestamp::Floating(naive))
}
