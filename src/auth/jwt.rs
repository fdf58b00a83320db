use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{auth::claims::Claims, config::JwtConfig, error::AppError, state::AppState};

/// `typ` header value of issued tokens.
pub const TOKEN_TYPE: &str = "JWS";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        AppError::Unauthorized(e.to_string())
    }
}

/// HS512 signing and verification keys with the issuer and lifetime of tokens.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            ttl_seconds,
        } = state.config.jwt.clone();
        Self::new(secret.as_bytes(), issuer, Duration::from_secs(ttl_seconds))
    }
}

impl JwtKeys {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl,
        }
    }

    pub fn sign(&self, username: &str) -> Result<String, AppError> {
        if username.is_empty() {
            return Err(AppError::validation("cannot issue a token without a username"));
        }
        let now = OffsetDateTime::now_utc().unix_timestamp().max(0) as u64;
        let claims = Claims {
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl.as_secs(),
            username: username.to_string(),
        };
        let mut header = Header::new(Algorithm::HS512);
        header.typ = Some(TOKEN_TYPE.to_string());
        let token = encode(&header, &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("sign token: {e}")))?;
        debug!(%username, "jwt signed");
        Ok(token)
    }

    /// Check signature, issuer and expiry, and return the username claim.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "iss"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "token rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if data.claims.username.is_empty() {
            warn!("token without username claim");
            return Err(TokenError::Invalid);
        }
        debug!(username = %data.claims.username, "jwt verified");
        Ok(data.claims.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, ttl_secs: u64) -> JwtKeys {
        JwtKeys::new(secret.as_bytes(), issuer, Duration::from_secs(ttl_secs))
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", "MKM", 3600);
        let token = keys.sign("alice").expect("sign");
        assert_eq!(keys.verify(&token).expect("verify"), "alice");
    }

    #[test]
    fn header_carries_hs512_and_type() {
        let keys = make_keys("dev-secret", "MKM", 3600);
        let token = keys.sign("alice").unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS512);
        assert_eq!(header.typ.as_deref(), Some(TOKEN_TYPE));
    }

    #[test]
    fn token_expires_after_ttl() {
        let keys = make_keys("dev-secret", "MKM", 1);
        let token = keys.sign("alice").unwrap();
        assert!(keys.verify(&token).is_ok());
        std::thread::sleep(Duration::from_millis(2100));
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_invalid_even_when_expired() {
        let good = make_keys("secret-a", "MKM", 3600);
        let other = make_keys("secret-b", "MKM", 3600);
        let token = good.sign("alice").unwrap();
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));

        let short = make_keys("secret-a", "MKM", 0);
        let stale = short.sign("alice").unwrap();
        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(other.verify(&stale), Err(TokenError::Invalid));
    }

    #[test]
    fn wrong_issuer_is_invalid() {
        let good = make_keys("same-secret", "MKM", 3600);
        let bad = make_keys("same-secret", "someone-else", 3600);
        let token = good.sign("alice").unwrap();
        assert_eq!(bad.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn empty_username_claim_is_invalid() {
        let keys = make_keys("dev-secret", "MKM", 3600);
        let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
        let claims = Claims {
            iss: "MKM".into(),
            iat: now,
            exp: now + 60,
            username: String::new(),
        };
        let token = encode(&Header::new(Algorithm::HS512), &claims, &keys.encoding).unwrap();
        assert_eq!(keys.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        let keys = make_keys("dev-secret", "MKM", 3600);
        assert_eq!(keys.verify("not.a.token"), Err(TokenError::Invalid));
        assert!(keys.sign("").is_err());
    }

    #[tokio::test]
    async fn keys_come_from_app_config() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        assert_eq!(keys.issuer, "test-issuer");
        assert_eq!(keys.ttl, Duration::from_secs(300));
    }
}
