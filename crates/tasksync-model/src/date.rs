//! Delivery date (de)serialization
//!
//! Forms send `YYYY-MM-DD`; the server echoes full ISO datetimes such as
//! `2024-01-01T00:00:00.000Z`. Only the calendar date is kept.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%Y-%m-%d";

/// Parse either a bare date or the date part of an ISO datetime
pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let date_part = raw.split('T').next().unwrap_or(raw).trim();
    NaiveDate::parse_from_str(date_part, FORMAT)
}

/// Serialize as `YYYY-MM-DD`
pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(FORMAT))
}

/// Deserialize from a bare date or ISO datetime
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// Same as the parent module, for optional dates; empty strings read as `None`
pub mod option {
    use super::{parse_date, FORMAT};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize `Some` as `YYYY-MM-DD`, `None` as null
    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.collect_str(&date.format(FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize null, `""`, a bare date or an ISO datetime
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse_date(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_iso_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_date("2024-01-01").unwrap(), expected);
        assert_eq!(parse_date("2024-01-01T00:00:00.000Z").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("tomorrow").is_err());
        assert!(parse_date("").is_err());
    }
}
