//! Authentication guards, expressed as extractors over the bearer token.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::storage::models::Tutor;
use crate::AppState;

/// The bearer token from the Authorization header, if present
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Guard for anonymous-only routes (login, registration, reset).
///
/// No header passes. A token that verifies means the caller is already
/// logged in. A token that fails verification is an internal error, not
/// "anonymous" — a present-but-broken token is fatal.
pub struct Anonymous;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Anonymous {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Anonymous);
        };
        match state.sessions.verify(token) {
            Ok(_) => Err(ApiError::AlreadyAuthenticated),
            Err(e) => Err(ApiError::internal(format!("invalid session token: {e}"))),
        }
    }
}

/// Guard for tutor routes: verifies the session token and carries the
/// email it was issued for.
pub struct AuthedTutor {
    pub email: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthedTutor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Err(ApiError::Unauthorized);
        };
        let email = state
            .sessions
            .verify(token)
            .map_err(|e| ApiError::internal(format!("invalid session token: {e}")))?;
        Ok(AuthedTutor { email })
    }
}

/// Guard for coordinator routes: resolves the full tutor record and checks
/// the coordinator bit.
pub struct Coordinator {
    pub tutor: Tutor,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Coordinator {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthedTutor { email } = AuthedTutor::from_request_parts(parts, state).await?;
        let tutor = state
            .db
            .get_tutor_by_email(&email)?
            .ok_or_else(|| ApiError::internal(format!("no tutor record for {email}")))?;
        if !tutor.coordinator {
            return Err(ApiError::Unauthorized);
        }
        Ok(Coordinator { tutor })
    }
}
