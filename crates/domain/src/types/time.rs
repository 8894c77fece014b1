//! Timestamps as sent by the OSIAM servers
//!
//! Depending on the endpoint and server version a point in time arrives as
//! epoch milliseconds or as an RFC 3339 string.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// Offset without a colon, e.g. `2011-10-10T00:00:00.000+0000`
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Epoch milliseconds or an RFC 3339 string; anything else is `None`
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => number.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .or_else(|_| DateTime::parse_from_str(text, COMPACT_OFFSET_FORMAT))
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        _ => None,
    }
}

/// `deserialize_with` helper for optional timestamps in either format
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_timestamp(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {value}"))),
    }
}
