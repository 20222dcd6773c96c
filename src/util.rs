//! Conversions between the engine's date format and `chrono` timestamps.
//!
//! The engine renders dates as `yyyy-MM-dd'T'HH:mm:ss.SSSZ`, e.g.
//! `2013-01-23T14:42:45.000+0200`.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

const ENGINE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";
const ENGINE_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
const LOCAL_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Render a timestamp in the engine's date format.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ENGINE_FORMAT).to_string()
}

/// Parse a timestamp returned by the engine.
///
/// Offsets with and without a colon are accepted; timestamps without an offset
/// are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::<FixedOffset>::parse_from_str(value, ENGINE_PARSE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, LOCAL_PARSE_FORMAT).map(|naive| naive.and_utc())
        })
        .map_err(|_| Error::InvalidTimestamp(value.to_owned()))
}

/// Serde adapter for required timestamps.
pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_timestamp(&value).map_err(de::Error::custom)
    }

    /// Serde adapter for nullable timestamps.
    pub(crate) mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub(crate) fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_str(&super::super::format_timestamp(value)),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|value| super::super::parse_timestamp(&value).map_err(de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_millis_and_offset() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&timestamp), "2024-01-02T03:04:05.000+0000");
    }

    #[test]
    fn parses_engine_offsets() {
        let expected = Utc.with_ymd_and_hms(2013, 1, 23, 12, 42, 45).unwrap();
        assert_eq!(parse_timestamp("2013-01-23T14:42:45.000+0200").unwrap(), expected);
        assert_eq!(parse_timestamp("2013-01-23T14:42:45.000+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2013-01-23T12:42:45").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(Error::InvalidTimestamp(value)) if value == "yesterday"
        ));
    }
}
