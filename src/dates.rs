//! ISO-8601 timestamps as the services emit them.
//!
//! Servers mix RFC 3339 (`2024-01-01T00:00:00Z`), offset-less timestamps with
//! seven fractional digits (`2024-01-01T00:00:00.1234567`) and the occasional
//! bare date. Offset-less values are UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Parse any accepted timestamp form.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Canonical wire form: RFC 3339, `Z` suffix, fractional digits only when present.
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn rfc3339_round_trips() {
        for raw in [
            "2024-01-01T00:00:00Z",
            "2023-06-15T13:45:30.250Z",
            "1999-12-31T23:59:59.000001Z",
        ] {
            let parsed = parse_date(raw).expect("parse");
            assert_eq!(format_date(&parsed), raw);
        }
    }

    #[test]
    fn offsets_convert_to_utc() {
        let parsed = parse_date("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(format_date(&parsed), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn offsetless_seven_digit_fraction_reads_as_utc() {
        let parsed = parse_date("2024-03-05T10:11:12.1234567").unwrap();
        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed.nanosecond(), 123_456_700);
        assert_eq!(format_date(&parsed), "2024-03-05T10:11:12.123456700Z");
    }

    #[test]
    fn minimum_server_date_parses() {
        let parsed = parse_date("0001-01-01T00:00:00").unwrap();
        assert_eq!(parsed.year(), 1);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let parsed = parse_date("2024-02-29").unwrap();
        assert_eq!(format_date(&parsed), "2024-02-29T00:00:00Z");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("").is_none());
        assert!(parse_date("2024-13-01T00:00:00Z").is_none());
    }
}
