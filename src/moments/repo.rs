use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::{
    db,
    error::AppError,
    moments::repo_types::{ListQuery, Moment, MomentPatch, MomentRow, NewMoment},
    sql,
};

/// Insert a moment and return the id the store assigned to it.
#[instrument(skip(db, moment), fields(username = %moment.username))]
pub async fn add_new_moment(db: &PgPool, moment: &NewMoment) -> Result<i64, AppError> {
    if moment.attachment().is_none() && moment.image_caption.is_some() {
        debug!("image caption without image content is not stored");
    }
    let stmt = sql::insert_moment(moment)?;
    let (id,) = db::insert_returning::<(i64,)>(db, stmt, "add moment").await?;
    Ok(id)
}

#[instrument(skip(db, patch))]
pub async fn update_moment(
    db: &PgPool,
    username: &str,
    id: i64,
    patch: &MomentPatch,
) -> Result<(), AppError> {
    if patch.is_empty() {
        debug!("no fields supplied; only last_modified_date changes");
    }
    db::execute_one(db, sql::update_moment(username, id, patch), "update moment").await
}

#[instrument(skip(db))]
pub async fn delete_moment(db: &PgPool, username: &str, id: i64) -> Result<(), AppError> {
    db::execute_one(db, sql::delete_moment(username, id), "delete moment").await
}

#[instrument(skip(db))]
pub async fn get_moment_details(db: &PgPool, username: &str, id: i64) -> Result<Moment, AppError> {
    let row: MomentRow = db::fetch_one(db, sql::select_moment(username, id), "moment").await?;
    Ok(row.into())
}

#[instrument(skip(db))]
pub async fn get_moments_list(
    db: &PgPool,
    username: &str,
    list: &ListQuery,
) -> Result<Vec<Moment>, AppError> {
    let rows: Vec<MomentRow> = db::fetch_all(db, sql::select_moments(username, list)).await?;
    Ok(rows.into_iter().map(Moment::from).collect())
}

#[instrument(skip(db))]
pub async fn get_moment_count(db: &PgPool, username: &str) -> Result<u64, AppError> {
    let (count,) =
        db::fetch_one::<(i64,)>(db, sql::count_moments(username), "moment count").await?;
    Ok(count.max(0) as u64)
}
