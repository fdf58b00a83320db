use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{field, instrument, warn, Span};

use crate::{
    auth::{
        dto::{CreateAccountRequest, LoginRequest, LoginResponse, PublicUser},
        extractors::AuthUser,
        jwt::JwtKeys,
        repo_types::{NewUser, User},
        services::{authenticate, create_account},
    },
    dates::parse_date,
    error::AppError,
    state::AppState,
    validation::{is_valid_email, validate_field},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/create-account", post(create_account_handler))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload), fields(username = field::Empty))]
pub async fn create_account_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let Json(payload) = payload?;
    Span::current().record("username", payload.username.as_str());
    for (field, value) in [
        ("fullname", payload.fullname.as_str()),
        ("username", payload.username.as_str()),
        ("emailid", payload.emailid.as_str()),
        ("password", payload.password.as_str()),
    ] {
        validate_field(field, value).inspect_err(|e| warn!(error = %e, "rejected account"))?;
    }
    if !is_valid_email(&payload.emailid) {
        warn!(emailid = %payload.emailid, "invalid email");
        return Err(AppError::validation("emailid is not a valid address"));
    }
    let birth_date = parse_date("birthdate", &payload.birthdate)?;

    let new_user = NewUser {
        username: payload.username,
        full_name: payload.fullname,
        birth_date,
        email_id: payload.emailid,
    };
    let user = create_account(&state.db, &new_user, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload), fields(username = field::Empty))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    Span::current().record("username", payload.username.as_str());
    validate_field("username", &payload.username)?;
    validate_field("password", &payload.password)?;

    let user = authenticate(&state.db, &payload.username, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(&user.username)?;
    Ok(Json(LoginResponse {
        access_token,
        username: user.username,
        expires_in: keys.ttl.as_secs(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = User::get_details(&state.db, &username).await?;
    Ok(Json(user.into()))
}
