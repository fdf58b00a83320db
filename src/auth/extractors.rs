use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::AppError;

lazy_static! {
    static ref BEARER_RE: Regex = Regex::new(r"^Bearer +([A-Za-z0-9_\-.~+/]+=*)$").unwrap();
}

/// Extracts and validates the bearer token, yielding the authenticated username.
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                AppError::unauthorized("missing Authorization header")
            })?;

        let token = BEARER_RE
            .captures(header)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| {
                warn!("invalid Authorization header format");
                AppError::unauthorized("invalid Authorization header")
            })?;

        let username = JwtKeys::from_ref(state).verify(token)?;
        Ok(AuthUser(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_pattern() {
        let token = |h: &str| {
            BEARER_RE
                .captures(h)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        };
        assert_eq!(token("Bearer abc.def-ghi_jk").as_deref(), Some("abc.def-ghi_jk"));
        assert_eq!(token("Bearer   abc==").as_deref(), Some("abc=="));
        assert_eq!(token("bearer abc"), None);
        assert_eq!(token("Bearer"), None);
        assert_eq!(token("Bearer abc def"), None);
        assert_eq!(token("Basic dXNlcjpwdw=="), None);
    }
}
