//! Two-stage timestamp normalization.
//!
//! A floating (offset-less) timestamp is first read as wall-clock time in the
//! source zone. The instant is then expressed in the destination zone and
//! finally in the final zone, which is what gets stored.
//!
//! Invariants:
//! - Ambiguous local times (DST fall-back) resolve to the earlier instant.
//! - Local times inside a DST gap are a `ConversionError`, never a panic.
//! - The result is always `Timestamp::Fixed` with a four-digit year.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use osdinfo_config::TimeZoneSettings;

use crate::error::ConversionError;
use crate::value::Timestamp;

/// Zone that floating timestamps are read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceZone {
    /// The host's local zone.
    Local,
    Named(Tz),
}

/// Converts timestamps from the source zone to the final zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneNormalizer {
    source: SourceZone,
    destination: Tz,
    final_zone: Tz,
}

impl TimezoneNormalizer {
    pub fn new(source: SourceZone, destination: Tz, final_zone: Tz) -> Self {
        Self {
            source,
            destination,
            final_zone,
        }
    }

    /// Build from validated configuration.
    pub fn from_config(settings: &TimeZoneSettings) -> Self {
        let source = settings
            .source
            .as_ref()
            .map_or(SourceZone::Local, |zone| SourceZone::Named(zone.tz()));
        Self::new(source, settings.destination.tz(), settings.final_zone.tz())
    }

    pub fn source(&self) -> SourceZone {
        self.source
    }

    /// Convert `timestamp` into the final zone.
    pub fn normalize(&self, timestamp: Timestamp) -> Result<Timestamp, ConversionError> {
        let instant = match timestamp {
            Timestamp::Fixed(dt) => dt,
            Timestamp::Floating(naive) => match self.source {
                SourceZone::Local => resolve_local(&Local, &naive)?,
                SourceZone::Named(tz) => resolve_local(&tz, &naive)?,
            },
        };

        let in_destination = instant.with_timezone(&self.destination);
        let in_final = in_destination.with_timezone(&self.final_zone).fixed_offset();

        if !(1000..=9999).contains(&in_final.year()) {
            return Err(ConversionError::OutOfRange {
                value: timestamp.to_string(),
            });
        }

        Ok(Timestamp::Fixed(in_final))
    }
}

fn resolve_local<Z: TimeZone>(
    zone: &Z,
    naive: &NaiveDateTime,
) -> Result<DateTime<FixedOffset>, ConversionError> {
    zone.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| ConversionError::NonexistentLocalTime {
            value: naive.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn chicago_to_utc() -> TimezoneNormalizer {
        TimezoneNormalizer::new(SourceZone::Named(Tz::America__Chicago), Tz::UTC, Tz::UTC)
    }

    #[test]
    fn test_floating_time_is_read_in_source_zone() {
        let result = chicago_to_utc()
            .normalize(Timestamp::Floating(naive(2020, 1, 1, 0, 0)))
            .unwrap();
        let Timestamp::Fixed(dt) = result else {
            panic!("expected a fixed timestamp");
        };
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.naive_local(), naive(2020, 1, 1, 6, 0));
    }

    #[test]
    fn test_final_zone_decides_the_offset() {
        let normalizer = TimezoneNormalizer::new(
            SourceZone::Named(Tz::UTC),
            Tz::America__Chicago,
            Tz::Asia__Tokyo,
        );
        let result = normalizer
            .normalize(Timestamp::Floating(naive(2020, 6, 1, 12, 0)))
            .unwrap();
        let Timestamp::Fixed(dt) = result else {
            panic!("expected a fixed timestamp");
        };
        assert_eq!(dt.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(dt.naive_local(), naive(2020, 6, 1, 21, 0));
    }

    #[test]
    fn test_fixed_input_keeps_its_instant() {
        let input = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2020, 3, 22, 14, 0, 0)
            .unwrap();
        let result = chicago_to_utc().normalize(Timestamp::Fixed(input)).unwrap();
        let Timestamp::Fixed(dt) = result else {
            panic!("expected a fixed timestamp");
        };
        assert_eq!(dt.with_timezone(&Utc), input.with_timezone(&Utc));
    }

    #[test]
    fn test_ambiguous_time_resolves_to_earlier_instant() {
        // 01:30 occurs twice in Chicago on 2020-11-01; the first is CDT (-5).
        let result = chicago_to_utc()
            .normalize(Timestamp::Floating(naive(2020, 11, 1, 1, 30)))
            .unwrap();
        assert_eq!(result.naive_local(), naive(2020, 11, 1, 6, 30));
    }

    #[test]
    fn test_dst_gap_is_a_conversion_error() {
        // 02:30 does not exist in Chicago on 2020-03-08.
        let err = chicago_to_utc()
            .normalize(Timestamp::Floating(naive(2020, 3, 8, 2, 30)))
            .unwrap_err();
        assert!(matches!(err, ConversionError::NonexistentLocalTime { .. }));
    }

    #[test]
    fn test_out_of_range_after_conversion() {
        let normalizer =
            TimezoneNormalizer::new(SourceZone::Named(Tz::UTC), Tz::UTC, Tz::Pacific__Kiritimati);
        let err = normalizer
            .normalize(Timestamp::Floating(naive(9999, 12, 31, 23, 0)))
            .unwrap_err();
        assert!(matches!(err, ConversionError::OutOfRange { .. }));
    }

    #[test]
    fn test_from_config_defaults_to_local_source() {
        let settings = TimeZoneSettings {
            source: None,
            destination: osdinfo_config::resolve_zone("UTC").unwrap(),
            final_zone: osdinfo_config::resolve_zone("Tokyo Standard Time").unwrap(),
        };
        let normalizer = TimezoneNormalizer::from_config(&settings);
        assert_eq!(normalizer.source(), SourceZone::Local);
    }
}
