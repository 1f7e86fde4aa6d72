//! Timestamp helpers
//!
//! All timestamps on the wire are RFC 3339 UTC with millisecond precision
//! and a `Z` suffix (e.g. `2025-10-26T14:30:45.123Z`).

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time formatted for the wire
pub fn now_iso() -> String {
    to_iso(Utc::now())
}

/// Format a timestamp for the wire
pub fn to_iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_format_has_millis_and_z() {
        let ts = Utc.with_ymd_and_hms(2025, 10, 26, 14, 30, 45).unwrap();
        assert_eq!(to_iso(ts), "2025-10-26T14:30:45.000Z");
    }

    #[test]
    fn test_now_iso_parses_back() {
        let s = now_iso();
        assert!(DateTime::parse_from_rfc3339(&s).is_ok());
        assert!(s.ends_with('Z'));
    }
}
