//! Timestamp serialization helpers
//!
//! Providers report change submission times as RFC 3339 strings with
//! millisecond precision (`2012-10-09T06:12:42.058Z`). These helpers parse that
//! form and write it back unchanged, so a timestamp survives a JSON round trip
//! byte for byte.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp the way providers report it (millisecond precision, `Z`).
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize `Option<DateTime<Utc>>` as an optional RFC 3339 string.
#[allow(clippy::ref_option)]
pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_some(&format_timestamp(dt)),
        None => serializer.serialize_none(),
    }
}

/// Deserialize an optional RFC 3339 string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<String>::deserialize(deserializer)? {
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| Error::custom(format!("Invalid RFC3339 timestamp: {s}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_timestamps_round_trip() {
        let raw = "2012-10-09T06:12:42.058Z";
        let parsed = parse_timestamp(raw).unwrap();
        assert_eq!(format_timestamp(&parsed), raw);
    }

    #[test]
    fn offsets_are_converted_to_utc() {
        let parsed = parse_timestamp("2011-09-10T03:36:41.958+02:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2011-09-10T01:36:41.958Z");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}
