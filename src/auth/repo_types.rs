use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::{error::AppError, schema::users};

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash produced by pgcrypto, never exposed
    #[sqlx(rename = "fullname")]
    pub full_name: String,
    #[sqlx(rename = "birthdate")]
    #[serde(with = "crate::dates")]
    pub birth_date: Date,
    #[sqlx(rename = "emailid")]
    pub email_id: String,
    #[sqlx(rename = "account_creation_time")]
    #[serde(with = "time::serde::rfc3339")]
    pub account_creation_date: OffsetDateTime,
}

/// Identity fields supplied when an account is created. The password travels
/// separately and is hashed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub birth_date: Date,
    pub email_id: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), AppError> {
        users::USERNAME.require(&self.username)?;
        users::FULL_NAME.require(&self.full_name)?;
        users::EMAIL_ID.require(&self.email_id)?;
        Ok(())
    }
}
