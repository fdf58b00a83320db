use sqlx::PgPool;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        password::verify_password,
        repo_types::{NewUser, User},
    },
    error::AppError,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Resolve a username/password pair to its user. An unknown username and a
/// wrong password are indistinguishable to the caller.
#[instrument(skip(db, password))]
pub async fn authenticate(db: &PgPool, username: &str, password: &str) -> Result<User, AppError> {
    let user = match User::get_details(db, username).await {
        Ok(u) => u,
        Err(AppError::NotFound(_)) => {
            warn!(%username, "login unknown username");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }
        Err(e) => {
            error!(error = %e, "get_details failed");
            return Err(e);
        }
    };

    if !verify_password(db, password, &user.password_hash).await {
        warn!(%username, "login invalid password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    info!(%username, "user logged in");
    Ok(user)
}

#[instrument(skip(db, user, password), fields(username = %user.username))]
pub async fn create_account(db: &PgPool, user: &NewUser, password: &str) -> Result<User, AppError> {
    match User::create(db, user, password).await {
        Ok(created) => {
            info!("account created");
            Ok(created)
        }
        Err(e) => {
            error!(error = %e, "create account failed");
            Err(e)
        }
    }
}
