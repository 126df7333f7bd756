use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::extract::{Anonymous, AuthedTutor};
use crate::api::response::{ApiError, JSend, MessageResponse};
use crate::auth::reset;
use crate::storage::models::Tutor;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub name: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct InitiateResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteResetRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub email: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    _guard: Anonymous,
    Json(req): Json<LoginRequest>,
) -> Result<Json<JSend<LoginResponse>>, ApiError> {
    let Some(tutor) = state.db.get_tutor_by_email(&req.email)? else {
        return Err(ApiError::InvalidCredentials);
    };

    // A deactivated account answers exactly like a wrong password
    if !tutor.active {
        return Err(ApiError::InvalidCredentials);
    }
    if !state.credentials.verify(&req.password, &tutor.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.sessions.issue(&tutor.email)?;
    tracing::debug!(tutor_id = %tutor.id, "Tutor logged in");

    Ok(JSend::success(LoginResponse {
        name: tutor.name,
        token,
    }))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    _guard: Anonymous,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    let password_hash = state.credentials.hash(&req.password)?;
    let tutor = Tutor {
        active: true,
        coordinator: state.config.coordinators.contains(&req.email),
        created_at: Utc::now(),
        current_request: None,
        email: req.email,
        id: Uuid::new_v4().to_string(),
        name: req.name,
        password_hash,
        reset_generation: 0,
    };

    if !state.db.create_tutor(&tutor)? {
        return Err(ApiError::EmailInUse);
    }

    tracing::info!(tutor_id = %tutor.id, coordinator = tutor.coordinator, "Tutor registered");
    Ok(JSend::success(MessageResponse::new("successfully registered")))
}

pub async fn initiate_reset(
    State(state): State<Arc<AppState>>,
    _guard: Anonymous,
    Json(req): Json<InitiateResetRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    // The ack never reveals whether the email matches an account, nor
    // whether that account is deactivated.
    if let Some(tutor) = state.db.get_tutor_by_email(&req.email)? {
        if tutor.active {
            let ttl_minutes = state.config.auth.reset_token_ttl_minutes;
            let token = reset::issue(&state.config.auth.signing_key, &tutor, ttl_minutes)?;
            let url = format!(
                "{}/resetPassword/{}/{}",
                state.config.node.public_url, tutor.id, token
            );
            let body = format!(
                "Click the following link to reset your password. \
                 This link will be valid for {ttl_minutes} minutes:\n\n{url}"
            );

            // Dispatch failures are logged and swallowed; the caller's view
            // is unchanged either way
            if let Err(e) = state
                .mailer
                .send(&tutor.email, "Reset Tutor Queue Password", &body)
                .await
            {
                tracing::error!(error = %e, tutor_id = %tutor.id, "Failed to dispatch reset mail");
            }
        }
    }

    Ok(JSend::success(MessageResponse::new(
        "reset request placed successfully",
    )))
}

pub async fn complete_reset(
    State(state): State<Arc<AppState>>,
    _guard: Anonymous,
    Path((id, token)): Path<(String, String)>,
    Json(req): Json<CompleteResetRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    let Some(tutor) = state.db.get_tutor(&id)? else {
        return Err(ApiError::InvalidCredentials);
    };
    if !tutor.active {
        return Err(ApiError::InvalidCredentials);
    }

    let claims = reset::verify(&state.config.auth.signing_key, &tutor, &token)
        .map_err(|_| ApiError::InvalidCredentials)?;

    let password_hash = state.credentials.hash(&req.password)?;
    if !state
        .db
        .store_password_hash(&tutor.id, &password_hash, claims.generation)?
    {
        // The generation moved underneath us: the token was already consumed
        return Err(ApiError::InvalidCredentials);
    }

    tracing::info!(tutor_id = %tutor.id, "Password reset");
    Ok(JSend::success(MessageResponse::new(
        "password reset successfully",
    )))
}

pub async fn is_authenticated(tutor: AuthedTutor) -> Json<JSend<IdentityResponse>> {
    JSend::success(IdentityResponse { email: tutor.email })
}
