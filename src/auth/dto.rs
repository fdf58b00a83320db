use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::auth::repo_types::User;

/// Request body for account creation.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub password: String,
    pub fullname: String,
    pub birthdate: String,
    pub emailid: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub username: String,
    pub expires_in: u64,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub username: String,
    pub fullname: String,
    #[serde(with = "crate::dates")]
    pub birthdate: Date,
    pub emailid: String,
    #[serde(with = "time::serde::rfc3339")]
    pub account_creation_date: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            username: u.username,
            fullname: u.full_name,
            birthdate: u.birth_date,
            emailid: u.email_id,
            account_creation_date: u.account_creation_date,
        }
    }
}
