//! Parsing and serialization of calendar dates as `YYYY-MM-DD` strings.
//!
//! Use with `#[serde(with = "crate::date_format")]` for [Date] fields and
//! `#[serde(with = "crate::date_format::option", default)]` for `Option<Date>` fields.

use serde::{Deserialize, Deserializer, Serializer};
use time::{
    Date, OffsetDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::Error;

/// Date format used on the wire and in the database, e.g. "2024-01-05".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a date from either `YYYY-MM-DD` or an RFC 3339 date-time.
///
/// For date-times the calendar date in UTC is kept, so "2024-01-31T23:30:00-05:00"
/// becomes 2024-02-01.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `text` is in neither format.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    let text = text.trim();

    Date::parse(text, DATE_FORMAT)
        .or_else(|_| {
            OffsetDateTime::parse(text, &Rfc3339)
                .map(|date_time| date_time.to_offset(UtcOffset::UTC).date())
        })
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = date
        .format(DATE_FORMAT)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).map_err(serde::de::Error::custom)
}

pub mod option {
    //! The same format as the parent module for optional dates, `None` maps to null.

    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use time::Date;

    use super::{DATE_FORMAT, parse_date};

    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date
            .map(|date| date.format(DATE_FORMAT))
            .transpose()
            .map_err(serde::ser::Error::custom)?;
        formatted.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse_date(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::{Date, macros::date};

    use crate::Error;

    use super::parse_date;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Dated {
        #[serde(with = "crate::date_format")]
        date: Date,
        #[serde(with = "crate::date_format::option", default)]
        end_date: Option<Date>,
    }

    #[test]
    fn parses_plain_date() {
        assert_eq!(parse_date("2024-01-05"), Ok(date!(2024 - 01 - 05)));
    }

    #[test]
    fn parses_rfc3339_in_utc() {
        assert_eq!(
            parse_date("2024-01-31T23:30:00-05:00"),
            Ok(date!(2024 - 02 - 01))
        );
        assert_eq!(
            parse_date("2024-01-05T00:00:00.000Z"),
            Ok(date!(2024 - 01 - 05))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_date("05/01/2024"),
            Err(Error::InvalidDate("05/01/2024".to_owned()))
        );
        assert_eq!(
            parse_date("2024-02-30"),
            Err(Error::InvalidDate("2024-02-30".to_owned()))
        );
    }

    #[test]
    fn serializes_as_plain_dates() {
        let dated = Dated {
            date: date!(2024 - 03 - 09),
            end_date: None,
        };

        let json = serde_json::to_string(&dated).unwrap();

        assert_eq!(json, r#"{"date":"2024-03-09","end_date":null}"#);
    }

    #[test]
    fn missing_optional_date_is_none() {
        let dated: Dated = serde_json::from_str(r#"{"date":"2024-03-09"}"#).unwrap();

        assert_eq!(dated.end_date, None);
    }
}
