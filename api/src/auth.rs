use axum::http::HeaderMap;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScopeMode;
use crate::error::{ApiError, ApiResult};
use crate::pagination::Scope;
use crate::AppState;

// ── JWT Claims ──

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // stable identity token
    pub exp: usize,  // expiry (unix timestamp)
}

// ── Identity from the Authorization header ──

/// The caller's identity, or `None` when no valid bearer token is present.
pub fn current_identity(headers: &HeaderMap, jwt_secret: &str) -> Option<String> {
    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            debug!("rejecting bearer token: {e}");
            None
        }
    }
}

/// Maps a request onto the pagination scope it reads and mutates.
pub fn resolve_scope(state: &AppState, headers: &HeaderMap) -> ApiResult<Scope> {
    match state.scope_mode {
        ScopeMode::Global => Ok(Scope::Global),
        ScopeMode::PerUser => current_identity(headers, &state.jwt_secret)
            .map(Scope::User)
            .ok_or_else(|| ApiError::Unauthorized("per-user pagination needs an identity".into())),
    }
}
