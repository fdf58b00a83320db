//! Values bound to statement placeholders.

use sqlx::postgres::PgArguments;
use sqlx::Arguments;
use time::Date;

/// A caller-supplied value bound to a `$n` placeholder. Never spliced into SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Bytes(Vec<u8>),
    TextArray(Vec<String>),
    BigInt(i64),
    Date(Date),
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::Text(s.to_string())
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::Text(s)
    }
}

impl From<i64> for BindValue {
    fn from(n: i64) -> Self {
        BindValue::BigInt(n)
    }
}

impl From<Date> for BindValue {
    fn from(d: Date) -> Self {
        BindValue::Date(d)
    }
}

/// Encode bound values in placeholder order for `sqlx::query_with`.
pub fn into_arguments(params: Vec<BindValue>) -> PgArguments {
    let mut args = PgArguments::default();
    for p in params {
        match p {
            BindValue::Text(s) => args.add(s),
            BindValue::Bytes(b) => args.add(b),
            BindValue::TextArray(v) => args.add(v),
            BindValue::BigInt(n) => args.add(n),
            BindValue::Date(d) => args.add(d),
        }
    }
    args
}
