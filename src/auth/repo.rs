use sqlx::PgPool;
use tracing::instrument;

use crate::{
    auth::repo_types::{NewUser, User},
    db,
    error::AppError,
    sql,
};

impl User {
    /// Load a user by username.
    #[instrument(skip(db))]
    pub async fn get_details(db: &PgPool, username: &str) -> Result<User, AppError> {
        db::fetch_one(db, sql::select_user(username), "user").await
    }

    /// Create an account; the store hashes `password` with a fresh salt.
    /// A taken username is a constraint violation.
    #[instrument(skip(db, user, password), fields(username = %user.username))]
    pub async fn create(db: &PgPool, user: &NewUser, password: &str) -> Result<User, AppError> {
        let stmt = sql::insert_user(user, password)?;
        db::insert_returning(db, stmt, "create account").await
    }
}
