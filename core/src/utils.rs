//! Naive-datetime ISO-8601 formatting shared by the records catalog and the
//! pipeline factory.
//!
//! Record keys and object store paths both embed an instance's start time as
//! a naive (no-offset) ISO-8601 string — the timezone is carried separately
//! as part of the event, not repeated in every path component.

use chrono::NaiveDateTime;

/// Formats a naive datetime as `YYYY-MM-DDTHH:MM:SS`, with fractional
/// seconds included only when non-zero.
#[must_use]
pub fn isostringify(naive: NaiveDateTime) -> String {
    if naive.and_utc().timestamp_subsec_nanos() == 0 {
        naive.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

/// Parses a naive ISO-8601 datetime string produced by [`isostringify`].
#[must_use]
pub fn isoparse(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn stringify_omits_fraction_when_whole_second() {
        let naive = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap();
        assert_eq!(isostringify(naive), "2025-03-14T09:26:53");
    }

    #[test]
    fn stringify_keeps_fraction_when_present() {
        let naive = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_milli_opt(9, 26, 53, 500)
            .unwrap();
        assert_eq!(isostringify(naive), "2025-03-14T09:26:53.500");
    }

    #[test]
    fn roundtrips_through_parse() {
        let naive = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap();
        assert_eq!(isoparse(&isostringify(naive)), Some(naive));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(isoparse("not-a-date"), None);
    }
}
