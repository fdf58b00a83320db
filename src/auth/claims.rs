use serde::{Deserialize, Serialize};

/// JWT payload carried by every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String, // issuer
    pub iat: u64,    // issued at (unix timestamp)
    pub exp: u64,    // expires at (unix timestamp)
    #[serde(default)]
    pub username: String,
}
