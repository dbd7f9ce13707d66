pub mod date_time {
    use core::fmt;

    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{
        de::{self, Unexpected, Visitor},
        Deserializer, Serializer,
    };

    /// Parses an ISO-8601 timestamp. Offsets are honored, naive values are
    /// taken as UTC.
    pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
            return Some(date_time.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize_utc<S>(
        date_time: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer
            .serialize_str(&date_time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TimestampVisitor;

        impl<'de> Visitor<'de> for TimestampVisitor {
            type Value = DateTime<Utc>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an ISO-8601 timestamp")
            }

            fn visit_str<E>(self, value: &str) -> Result<DateTime<Utc>, E>
            where
                E: de::Error,
            {
                parse_utc(value).ok_or_else(|| {
                    de::Error::invalid_value(Unexpected::Str(value), &self)
                })
            }
        }

        deserializer.deserialize_str(TimestampVisitor)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    use super::date_time::{self, parse_utc};

    #[derive(Debug, Serialize, Deserialize)]
    struct Stamped {
        #[serde(
            serialize_with = "date_time::serialize_utc",
            deserialize_with = "date_time::deserialize_utc"
        )]
        at: chrono::DateTime<Utc>,
    }

    #[test]
    fn parses_offsets_and_naive_values() {
        let expected = Utc.with_ymd_and_hms(2014, 10, 2, 15, 1, 23).unwrap();
        assert_eq!(parse_utc("2014-10-02T15:01:23Z"), Some(expected));
        assert_eq!(parse_utc("2014-10-02T17:01:23+02:00"), Some(expected));
        assert_eq!(parse_utc("2014-10-02T15:01:23"), Some(expected));
        assert_eq!(parse_utc("2014-10-02 15:01:23"), Some(expected));
        assert_eq!(parse_utc("yesterday"), None);
    }

    #[test]
    fn serializes_with_zulu_suffix() {
        let stamped: Stamped =
            serde_json::from_str(r#"{"at":"2024-03-01T10:00:00.250"}"#).unwrap();
        let json = serde_json::to_string(&stamped).unwrap();
        assert_eq!(json, r#"{"at":"2024-03-01T10:00:00.250Z"}"#);
    }

    #[test]
    fn rejects_garbage() {
        let result = serde_json::from_str::<Stamped>(r#"{"at":"not a date"}"#);
        assert!(result.is_err());
    }
}
