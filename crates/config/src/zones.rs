//! Time zone identifier resolution.
//!
//! Responsibilities:
//! - Resolve IANA identifiers (`America/Chicago`) through `chrono-tz`.
//! - Resolve the common Windows zone identifiers (`Central Standard Time`)
//!   that deployment technicians copy from `tzutil /l`.
//!
//! Does NOT handle:
//! - Converting timestamps (see `osdinfo_core::timezone`).
//!
//! Invariants:
//! - Windows identifiers match case-insensitively; IANA identifiers match exactly.
//! - The original identifier is preserved for display and logging.

use std::fmt;

use chrono_tz::Tz;
use thiserror::Error;

/// Windows zone identifiers mapped to their IANA equivalents.
const WINDOWS_ZONES: &[(&str, &str)] = &[
    ("UTC", "UTC"),
    ("Coordinated Universal Time", "UTC"),
    ("GMT Standard Time", "Europe/London"),
    ("Greenwich Standard Time", "Atlantic/Reykjavik"),
    ("W. Europe Standard Time", "Europe/Berlin"),
    ("Central Europe Standard Time", "Europe/Budapest"),
    ("Central European Standard Time", "Europe/Warsaw"),
    ("Romance Standard Time", "Europe/Paris"),
    ("E. Europe Standard Time", "Europe/Chisinau"),
    ("FLE Standard Time", "Europe/Kiev"),
    ("GTB Standard Time", "Europe/Bucharest"),
    ("Russian Standard Time", "Europe/Moscow"),
    ("Eastern Standard Time", "America/New_York"),
    ("Central Standard Time", "America/Chicago"),
    ("Mountain Standard Time", "America/Denver"),
    ("US Mountain Standard Time", "America/Phoenix"),
    ("Pacific Standard Time", "America/Los_Angeles"),
    ("Alaskan Standard Time", "America/Anchorage"),
    ("Hawaiian Standard Time", "Pacific/Honolulu"),
    ("Atlantic Standard Time", "America/Halifax"),
    ("SA Pacific Standard Time", "America/Bogota"),
    ("E. South America Standard Time", "America/Sao_Paulo"),
    ("India Standard Time", "Asia/Kolkata"),
    ("China Standard Time", "Asia/Shanghai"),
    ("Tokyo Standard Time", "Asia/Tokyo"),
    ("Singapore Standard Time", "Asia/Singapore"),
    ("AUS Eastern Standard Time", "Australia/Sydney"),
    ("New Zealand Standard Time", "Pacific/Auckland"),
];

/// The identifier did not name a known time zone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time zone identifier '{0}'")]
pub struct UnknownZone(pub String);

/// A validated time zone together with the identifier it was configured as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneId {
    id: String,
    tz: Tz,
}

impl ZoneId {
    /// The identifier as configured.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The resolved zone.
    pub fn tz(&self) -> Tz {
        self.tz
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id == self.tz.name() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.id, self.tz.name())
        }
    }
}

/// Resolve a Windows or IANA time zone identifier.
pub fn resolve_zone(id: &str) -> Result<ZoneId, UnknownZone> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(UnknownZone(id.to_string()));
    }

    let iana = WINDOWS_ZONES
        .iter()
        .find(|(windows, _)| windows.eq_ignore_ascii_case(trimmed))
        .map(|(_, iana)| *iana)
        .unwrap_or(trimmed);

    let tz = iana
        .parse::<Tz>()
        .map_err(|_| UnknownZone(trimmed.to_string()))?;

    Ok(ZoneId {
        id: trimmed.to_string(),
        tz,
    })
}
