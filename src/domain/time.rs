//! Timezone-aware instants
//!
//! Every timestamp stored in a TaskMeta carries its UTC offset. Strings
//! without an offset (naive instants) are rejected at parse time.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::meta::MetaError;

/// An instant with timezone information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Current instant, in UTC
    pub fn now() -> Self {
        Self(Utc::now().fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self(dt)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.fixed_offset())
    }
}

/// ISO-8601 with an explicit offset, e.g. `2018-01-01T00:00:00+00:00`
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }
}

impl FromStr for Timestamp {
    type Err = MetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt));
        }
        // Space-separated ISO-8601, as written by other tools
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
            return Ok(Self(dt));
        }

        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
            || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok();
        if naive {
            Err(MetaError::NaiveTimestamp(s.to_string()))
        } else {
            Err(MetaError::InvalidTimestamp(s.to_string()))
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_offset() {
        let ts: Timestamp = "2018-01-01T00:00:00+00:00".parse().unwrap();
        assert_eq!(ts.to_string(), "2018-01-01T00:00:00+00:00");
    }

    #[test]
    fn parse_zulu_renders_as_offset() {
        let ts: Timestamp = "2020-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(ts.to_string(), "2020-01-01T00:00:00+00:00");
    }

    #[test]
    fn keeps_non_utc_offset() {
        let ts: Timestamp = "2021-03-04T05:06:07+02:00".parse().unwrap();
        assert_eq!(ts.to_string(), "2021-03-04T05:06:07+02:00");
    }

    #[test]
    fn keeps_fractional_seconds() {
        let ts: Timestamp = "2021-03-04T05:06:07.123456+00:00".parse().unwrap();
        assert_eq!(ts.to_string(), "2021-03-04T05:06:07.123456+00:00");
    }

    #[test]
    fn space_separator_accepted() {
        let ts: Timestamp = "2021-03-04 05:06:07+00:00".parse().unwrap();
        assert_eq!(ts.to_string(), "2021-03-04T05:06:07+00:00");
    }

    #[test]
    fn naive_timestamp_rejected() {
        let err = "2018-01-01T00:00:00".parse::<Timestamp>().unwrap_err();
        assert_eq!(err, MetaError::NaiveTimestamp("2018-01-01T00:00:00".to_string()));
    }

    #[test]
    fn garbage_rejected() {
        let err = "yesterday".parse::<Timestamp>().unwrap_err();
        assert!(matches!(err, MetaError::InvalidTimestamp(_)));
    }

    #[test]
    fn ordering_follows_instant() {
        let a: Timestamp = "2020-01-01T00:00:00+00:00".parse().unwrap();
        let b: Timestamp = "2020-01-01T00:00:01+00:00".parse().unwrap();
        assert!(a < b);
    }
}
