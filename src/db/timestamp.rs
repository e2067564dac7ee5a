//! Timestamp parsing and formatting shared by rows and filters.
//!
//! Rows are written with a fixed-width UTC form (`2026-01-02T03:04:05.123456Z`) so
//! that lexical and chronological order agree. Reading is lenient: RFC 3339 with
//! any offset, or a naive ISO-8601 timestamp interpreted as UTC, as returned by
//! `timestamp without time zone` columns.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp as stored by the database.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Format a timestamp with microsecond precision in UTC.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde serializer for `#[serde(with = "crate::db::timestamp")]`.
///
/// # Errors
/// Propagates serializer errors.
pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(ts))
}

/// Serde deserializer for `#[serde(with = "crate::db::timestamp")]`.
///
/// # Errors
/// Returns an error if the value is not a recognizable timestamp string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Serde helpers for nullable timestamp columns.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_timestamp, parse_timestamp};

    /// Serialize `None` as `null`.
    ///
    /// # Errors
    /// Propagates serializer errors.
    pub fn serialize<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => serializer.serialize_some(&format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize `null` or a missing value as `None`.
    ///
    /// # Errors
    /// Returns an error if a present value is not a recognizable timestamp string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|raw| {
            parse_timestamp(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
        })
        .transpose()
    }
}
