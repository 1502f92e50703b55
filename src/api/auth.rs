//! Bearer credential verification
//!
//! Identity is issued elsewhere; this module only maps a presented token to
//! the user id it was issued for.

use super::handlers::AppError;
use super::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;

/// Maps a bearer token to a verified user id
pub trait IdentityProvider: Send + Sync {
    fn verify(&self, token: &str) -> Option<String>;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdentityConfigError {
    #[error("Malformed token entry {0:?}: expected token=user_id")]
    MalformedEntry(String),
}

/// Fixed token table, held as SHA-256 digests so raw tokens are not kept
/// in memory after startup.
#[derive(Default)]
pub struct StaticTokenIdentity {
    tokens: HashMap<[u8; 32], String>,
}

impl StaticTokenIdentity {
    /// Parse `token=user_id` pairs separated by commas
    pub fn parse(spec: &str) -> Result<Self, IdentityConfigError> {
        let mut tokens = HashMap::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, user_id) = entry
                .split_once('=')
                .map(|(t, u)| (t.trim(), u.trim()))
                .filter(|(t, u)| !t.is_empty() && !u.is_empty())
                .ok_or_else(|| IdentityConfigError::MalformedEntry(redact(entry)))?;
            tokens.insert(digest(token), user_id.to_string());
        }
        Ok(Self { tokens })
    }

    pub fn from_env() -> Result<Self, IdentityConfigError> {
        std::env::var("RELAY_API_TOKENS").map_or_else(|_| Ok(Self::default()), |s| Self::parse(&s))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityProvider for StaticTokenIdentity {
    fn verify(&self, token: &str) -> Option<String> {
        self.tokens.get(&digest(token)).cloned()
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Keep only what's after `=` so a malformed entry never echoes a token
fn redact(entry: &str) -> String {
    match entry.split_once('=') {
        Some((_, user_id)) => format!("***={user_id}"),
        None => "***".to_string(),
    }
}

/// Extractor yielding the verified user id of the caller
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

        state
            .identity
            .verify(token)
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
    }
}
