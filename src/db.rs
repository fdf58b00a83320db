//! Runs built statements, one transaction per logical operation.

use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, error, warn};

use crate::{
    error::AppError,
    sql::{into_arguments, Statement},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

pub async fn begin(db: &PgPool, access: Access) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = db.begin().await?;
    if access == Access::ReadOnly {
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
    }
    Ok(tx)
}

/// Fetch the single row a statement must match. Zero rows is `NotFound`,
/// more than one is `Internal`.
pub async fn fetch_one<T>(db: &PgPool, stmt: Statement, what: &str) -> Result<T, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let Statement { sql, params } = stmt;
    debug!(%sql, "query");
    let mut tx = begin(db, Access::ReadOnly).await?;
    let mut rows = sqlx::query_as_with::<Postgres, T, _>(&sql, into_arguments(params))
        .fetch_all(&mut *tx)
        .await?;
    tx.commit().await?;

    match rows.len() {
        1 => Ok(rows.remove(0)),
        0 => Err(AppError::NotFound(what.to_string())),
        n => {
            error!(rows = n, what, "single-row query matched several rows");
            Err(AppError::Internal(format!("{what}: expected one row, got {n}")))
        }
    }
}

pub async fn fetch_all<T>(db: &PgPool, stmt: Statement) -> Result<Vec<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let Statement { sql, params } = stmt;
    debug!(%sql, "query");
    let mut tx = begin(db, Access::ReadOnly).await?;
    let rows = sqlx::query_as_with::<Postgres, T, _>(&sql, into_arguments(params))
        .fetch_all(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows)
}

/// Run a mutating statement that must affect exactly one row; anything else
/// is rolled back and reported as a constraint failure.
pub async fn execute_one(db: &PgPool, stmt: Statement, what: &str) -> Result<(), AppError> {
    let Statement { sql, params } = stmt;
    debug!(%sql, "execute");
    let mut tx = begin(db, Access::ReadWrite).await?;
    let affected = sqlx::query_with::<Postgres, _>(&sql, into_arguments(params))
        .execute(&mut *tx)
        .await
        .map_err(AppError::from_write)?
        .rows_affected();

    if affected != 1 {
        tx.rollback().await?;
        warn!(affected, what, "statement did not affect exactly one row");
        return Err(AppError::Constraint(format!(
            "{what}: expected one affected row, got {affected}"
        )));
    }
    tx.commit().await?;
    Ok(())
}

/// Like [`execute_one`] for statements with a RETURNING clause.
pub async fn insert_returning<T>(db: &PgPool, stmt: Statement, what: &str) -> Result<T, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let Statement { sql, params } = stmt;
    debug!(%sql, "execute");
    let mut tx = begin(db, Access::ReadWrite).await?;
    let mut rows = sqlx::query_as_with::<Postgres, T, _>(&sql, into_arguments(params))
        .fetch_all(&mut *tx)
        .await
        .map_err(AppError::from_write)?;

    if rows.len() != 1 {
        tx.rollback().await?;
        warn!(rows = rows.len(), what, "insert did not return exactly one row");
        return Err(AppError::Constraint(format!(
            "{what}: expected one inserted row, got {}",
            rows.len()
        )));
    }
    tx.commit().await?;
    Ok(rows.remove(0))
}
