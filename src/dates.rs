//! Date handling for the MyGeotab wire format.
//!
//! The API sends and expects UTC timestamps such as `2024-03-01T12:30:00.000Z`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Format a timestamp the way the API expects it.
pub fn format_datetime(datetime: &DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp sent by the API.
///
/// Accepts RFC 3339 with any offset, and offset-less values which are taken as UTC.
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, NAIVE_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// A timestamp as a call parameter.
pub fn to_value(datetime: &DateTime<Utc>) -> Value {
    Value::String(format_datetime(datetime))
}

/// `serde(with = ...)` adapter for entity fields holding API timestamps.
pub mod geotab_datetime {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(datetime: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_datetime(datetime))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse_datetime(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid datetime: {text}")))
    }
}
