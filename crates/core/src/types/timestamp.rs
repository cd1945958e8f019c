//! Backend timestamps.
//!
//! The backend emits ISO-8601 timestamps both with an offset
//! (`2025-11-12T10:00:00+00:00`) and without one (`2025-11-12T10:00:00.123456`).
//! Naive values are taken as UTC.
//!
//! Use with `#[serde(with = "cartlink_core::timestamp")]`, or
//! `cartlink_core::timestamp::option` for optional fields.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Parse a backend timestamp, offset or naive.
#[must_use]
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

/// Serialize as RFC 3339 with a `Z` suffix.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Deserialize an offset or naive timestamp.
///
/// # Errors
///
/// Fails if the value is not a string or not a recognised timestamp.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// Optional timestamps; `null` and missing fields become `None`.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// # Errors
    ///
    /// Fails if a present value is not a recognised timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                super::parse(&raw)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
            })
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Timelike};
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: DateTime<Utc>,
        #[serde(default, with = "super::option")]
        done_at: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_parse_offset_and_naive() {
        let expected = Utc.with_ymd_and_hms(2025, 11, 12, 10, 0, 0).unwrap();
        assert_eq!(parse("2025-11-12T10:00:00+00:00"), Some(expected));
        assert_eq!(parse("2025-11-12T12:00:00+02:00"), Some(expected));
        assert_eq!(parse("2025-11-12T10:00:00"), Some(expected));
        assert_eq!(
            parse("2025-11-12T10:00:00.250000").map(|dt| dt.nanosecond()),
            Some(250_000_000)
        );
        assert_eq!(parse("mañana"), None);
    }

    #[test]
    fn test_serde_helpers() {
        let stamped: Stamped =
            serde_json::from_str(r#"{"at": "2025-11-12T10:00:00", "done_at": null}"#).unwrap();
        assert!(stamped.done_at.is_none());

        let json = serde_json::to_value(&stamped).unwrap();
        assert_eq!(json["at"], "2025-11-12T10:00:00Z");

        let missing: Stamped = serde_json::from_str(r#"{"at": "2025-11-12T10:00:00Z"}"#).unwrap();
        assert!(missing.done_at.is_none());

        assert!(serde_json::from_str::<Stamped>(r#"{"at": "soon"}"#).is_err());
    }
}
