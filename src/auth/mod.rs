pub mod jwks;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use jwks::JwksClient;

/// Claim set extracted from a verified bearer token. Only the subject is used
/// downstream; everything else is checked during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Token validation failures.
///
/// Everything except `KeyLookup` is a client-side credential problem (401);
/// `KeyLookup` means the identity provider's key set could not be resolved,
/// which is an infrastructure fault (500).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredentials,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("key lookup failed: {0}")]
    KeyLookup(String),
}
