use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Parameters a downstream handler supplies to request a new comment thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewThread {
    #[serde(default)]
    pub slug: Option<String>,

    /// Accepts RFC 3339, a naive ISO-8601 datetime (taken as UTC), a bare date,
    /// or integer Unix seconds.
    #[serde(default, alias = "autoClosesAt", deserialize_with = "deserialize_auto_close")]
    pub auto_closes_at: Option<DateTime<Utc>>,
}

impl NewThread {
    pub fn with_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            auto_closes_at: None,
        }
    }

    pub fn auto_closes_at(mut self, at: DateTime<Utc>) -> Self {
        self.auto_closes_at = Some(at);
        self
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a timestamp string into UTC. Strings without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_auto_close<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}"))),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("timestamp out of range")),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for auto_closes_at",
        )),
    }
}
