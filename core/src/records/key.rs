//! Object key coding: `"{event-uuid}/{start-iso}"`.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::EventId;
use crate::utils::{isoparse, isostringify};

/// A parsed, validated key: the `(event, instance.start)` pair an object
/// under the catalog's prefix was stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKey {
    /// The event the record belongs to.
    pub event: EventId,
    /// The instance start the record was captured at.
    pub start: NaiveDateTime,
}

/// Builds the key an uploaded record (or the prefix for a `list`) is stored
/// under: `"{event}/{isostringify(start)}"`.
#[must_use]
pub fn make_key(event: EventId, start: NaiveDateTime) -> String {
    format!("{event}/{}", isostringify(start))
}

/// Builds the prefix all of an event's records share.
#[must_use]
pub fn make_prefix(event: EventId) -> String {
    format!("{event}/")
}

/// Splits an object name at the first `/` into an event id and start time.
///
/// Malformed names (not a valid UUID, not a valid naive ISO-8601 suffix)
/// return `None`; the caller is expected to skip such entries rather than
/// fail the whole listing.
#[must_use]
pub fn parse_key(name: &str) -> Option<RecordKey> {
    let (event_part, start_part) = name.split_once('/')?;
    let event = Uuid::parse_str(event_part).ok()?;
    let start = isoparse(start_part)?;
    Some(RecordKey { event, start })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn roundtrips_through_make_and_parse() {
        let event = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let key = make_key(event, start);
        let parsed = parse_key(&key).unwrap();
        assert_eq!(parsed.event, event);
        assert_eq!(parsed.start, start);
    }

    #[test]
    fn rejects_non_uuid_prefix() {
        assert!(parse_key("not-a-uuid/2025-01-01T12:00:00").is_none());
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(parse_key("no-slash-here").is_none());
    }

    #[test]
    fn rejects_unparseable_suffix() {
        let event = Uuid::new_v4();
        assert!(parse_key(&format!("{event}/not-a-date")).is_none());
    }

    #[test]
    fn prefix_matches_key_prefix() {
        let event = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(make_key(event, start).starts_with(&make_prefix(event)));
    }
}
