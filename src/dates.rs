//! Calendar dates travel as `YYYY-MM-DD`.

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
use time::{format_description::FormatItem, macros::format_description, Date};

use crate::error::AppError;

pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_date(field: &str, value: &str) -> Result<Date, AppError> {
    Date::parse(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("{field} must be a date in YYYY-MM-DD form")))
}

pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    let text = date
        .format(DATE_FORMAT)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
    let text = String::deserialize(deserializer)?;
    Date::parse(&text, DATE_FORMAT).map_err(D::Error::custom)
}
