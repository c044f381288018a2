//! Timezone arithmetic for event-local naive datetimes.
//!
//! Event instances are stored as a naive local datetime plus the event's
//! IANA timezone name. Converting to UTC for comparison must go through a
//! real timezone database so DST transitions are handled correctly.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Errors converting between an event's local time and UTC.
#[derive(Debug, Error)]
pub enum TimezoneError {
    /// The configured timezone name isn't in the IANA database.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// The naive local time doesn't correspond to a valid instant in the
    /// zone (a DST "spring forward" gap) or is ambiguous in a way chrono
    /// refuses to resolve automatically.
    #[error("local time {0} is not a valid instant in zone {1}")]
    AmbiguousOrInvalid(NaiveDateTime, String),
}

/// Converts a naive local datetime in `zone` to a UTC instant.
///
/// `to_utc(naive, zone) = naive.attach(zone).to(UTC).drop_tz()`, per the
/// design note: DST transitions are resolved by the real tz database, not
/// by fixed-offset arithmetic.
pub fn to_utc(naive: NaiveDateTime, zone: &str) -> Result<DateTime<Utc>, TimezoneError> {
    let tz: Tz = zone
        .parse()
        .map_err(|_| TimezoneError::UnknownTimezone(zone.to_string()))?;

    match tz.from_local_datetime(&naive).single() {
        Some(local) => Ok(local.with_timezone(&Utc)),
        None => {
            // Ambiguous (fall-back DST overlap) or nonexistent (spring-forward
            // gap) instant. Fall back to the earliest candidate rather than
            // failing outright — matches how most schedulers treat DST edges.
            tz.from_local_datetime(&naive)
                .earliest()
                .map(|l| l.with_timezone(&Utc))
                .ok_or_else(|| TimezoneError::AmbiguousOrInvalid(naive, zone.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn converts_naive_local_to_utc() {
        let naive = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let utc = to_utc(naive, "UTC").unwrap();
        assert_eq!(utc.naive_utc(), naive);
    }

    #[test]
    fn handles_named_zone_offset() {
        let naive = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        // Europe/Warsaw is UTC+2 in June (CEST).
        let utc = to_utc(naive, "Europe/Warsaw").unwrap();
        assert_eq!(utc.naive_utc(), naive - chrono::Duration::hours(2));
    }

    #[test]
    fn rejects_unknown_zone() {
        let naive = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(matches!(
            to_utc(naive, "Not/AZone"),
            Err(TimezoneError::UnknownTimezone(_))
        ));
    }
}
