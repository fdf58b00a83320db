use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{PathRejection, QueryRejection},
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreatedMomentResponse, ListParams, MomentResponse, TotalMomentsResponse},
    form::MomentForm,
    repo,
    repo_types::{ListQuery, SortOrder},
};
use crate::{
    auth::extractors::AuthUser, error::AppError, state::AppState, validation::validate_field,
};

/// Largest accepted request body (image included).
pub const MAX_REQUEST_SIZE: usize = 10 * 1024 * 1024;
pub const MAX_PAGE_SIZE: u32 = 100;

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/moments/total", get(total_moments))
        .route("/moments/:id", get(get_moment))
        .route("/moments", get(list_moments))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/moments", post(create_moment))
        .route("/moments/:id", put(update_moment).delete(delete_moment))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn total_moments(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<Json<TotalMomentsResponse>, AppError> {
    let total_moments = repo::get_moment_count(&state.db, &username).await?;
    Ok(Json(TotalMomentsResponse { total_moments }))
}

#[instrument(skip(state))]
pub async fn list_moments(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<MomentResponse>>, AppError> {
    let Query(p) = params?;
    if p.current_page < 1 {
        return Err(AppError::validation("current_page must be at least 1"));
    }
    if p.page_size > MAX_PAGE_SIZE {
        return Err(AppError::validation(format!(
            "page_size must not exceed {MAX_PAGE_SIZE}"
        )));
    }
    let search = p.search.filter(|s| !s.is_empty());
    if let Some(term) = &search {
        validate_field("search", term)?;
    }
    let list = ListQuery {
        page_size: p.page_size,
        current_page: p.current_page,
        sort: SortOrder::from_token(p.sort_by.as_deref()),
        search,
    };
    if list.checked_offset().is_none() {
        return Err(AppError::validation("current_page is out of range"));
    }
    let moments = repo::get_moments_list(&state.db, &username, &list).await?;
    Ok(Json(moments.into_iter().map(MomentResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_moment(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MomentResponse>, AppError> {
    let Path(id) = id?;
    let moment = repo::get_moment_details(&state.db, &username, id).await?;
    Ok(Json(moment.into()))
}

#[instrument(skip(state, mp))]
pub async fn create_moment(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedMomentResponse>), AppError> {
    let moment = MomentForm::from_multipart(mp?)
        .await?
        .into_new_moment(&username)?;
    let id = repo::add_new_moment(&state.db, &moment).await?;
    info!(%username, id, "moment added");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/moments/{id}")) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(CreatedMomentResponse { id })))
}

#[instrument(skip(state, mp))]
pub async fn update_moment(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    id: Result<Path<i64>, PathRejection>,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    let patch = MomentForm::from_multipart(mp?).await?.into_patch()?;
    repo::update_moment(&state.db, &username, id, &patch).await?;
    info!(%username, id, "moment updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_moment(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    repo::delete_moment(&state.db, &username, id).await?;
    info!(%username, id, "moment deleted");
    Ok(StatusCode::NO_CONTENT)
}
