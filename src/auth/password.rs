//! Password checks delegated to pgcrypto. The application never computes or sees a hash
//! other than the one stored on the user row.

use sqlx::PgPool;
use tracing::{error, instrument};

use crate::{db, sql};

/// True when `plain` hashes to `stored_hash` under the salt embedded in it.
/// Any failure, including a malformed stored hash, counts as a mismatch.
#[instrument(skip_all)]
pub async fn verify_password(db: &PgPool, plain: &str, stored_hash: &str) -> bool {
    let stmt = sql::verify_password(plain, stored_hash);
    match db::fetch_one::<(Option<bool>,)>(db, stmt, "password check").await {
        Ok((is_equal,)) => is_equal.unwrap_or(false),
        Err(e) => {
            error!(error = %e, "password verification failed");
            false
        }
    }
}
