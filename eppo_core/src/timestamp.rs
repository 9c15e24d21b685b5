use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// A point in time, UTC. Flag allocations use this for their `start_at`/`end_at` bounds; events
/// use it for their `timestamp` field.
pub type Timestamp = DateTime<Utc>;

/// The sentinel used by allocations with no upper time bound.
pub fn max_timestamp() -> Timestamp {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .expect("valid date")
        .and_hms_milli_opt(0, 0, 0, 0)
        .expect("valid time")
        .and_utc()
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SS.sssZ`, always with exactly 3 fractional digits.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses an ISO-8601 timestamp, accepting only a literal `Z` suffix. `chrono`'s own
/// `DateTime<Utc>` parsing accepts and silently converts any other timezone designator (e.g.
/// `+05:00`, or even `+00:00`); this rejects anything but `Z` instead of normalizing it.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, String> {
    if !s.ends_with('Z') {
        return Err(format!("timestamp must use a Z suffix, not a timezone offset: {s}"));
    }
    let fixed = DateTime::parse_from_rfc3339(s).map_err(|e| e.to_string())?;
    Ok(fixed.with_timezone(&Utc))
}

/// `#[serde(deserialize_with = "deserialize_timestamp")]` for `Timestamp` fields.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(D::Error::custom)
}

/// `#[serde(deserialize_with = "deserialize_optional_timestamp")]` for `Option<Timestamp>` fields.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(s) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_timestamp(&s).map(Some).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_millisecond_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 9, 14, 23, 11).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(format_timestamp(&ts), "2024-06-09T14:23:11.123Z");
    }

    #[test]
    fn max_timestamp_is_end_of_9999() {
        let ts = max_timestamp();
        assert_eq!(ts.format("%Y").to_string(), "9999");
    }

    #[test]
    fn parses_z_suffix() {
        let ts = parse_timestamp("2024-06-09T14:23:11.123Z").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-06-09T14:23:11.123Z");
    }

    #[test]
    fn rejects_non_z_offset_designators() {
        assert!(parse_timestamp("2024-06-09T14:23:11+05:00").is_err());
        assert!(parse_timestamp("2024-06-09T14:23:11-00:00").is_err());
        assert!(parse_timestamp("2024-06-09T14:23:11+00:00").is_err());
    }
}
