use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

/// Parsed value of an optional setting; unset or unparsable falls back to `default`.
fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "MKM".into()),
            ttl_seconds: parse_or(std::env::var("JWT_TTL_SECONDS").ok(), 60 * 60),
        };
        Ok(Self {
            database_url,
            max_connections: parse_or(std::env::var("DATABASE_MAX_CONNECTIONS").ok(), 10),
            jwt,
        })
    }
}
