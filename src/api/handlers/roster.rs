use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::extract::Coordinator;
use crate::api::response::{ApiError, JSend, MessageResponse};
use crate::roster;
use crate::storage::models::Tutor;
use crate::storage::PairingError;
use crate::AppState;

use super::auth::IdentityResponse;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    /// Target tutor; the caller acts on themselves when absent
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetCoordinatorRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TutorSummaryResponse {
    pub active: bool,
    pub coordinator: bool,
    pub current_request: Option<String>,
    pub email: String,
    pub id: String,
    pub name: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn set_active(
    State(state): State<Arc<AppState>>,
    caller: Coordinator,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    toggle_active(&state, &caller, req.email, true)
}

pub async fn set_inactive(
    State(state): State<Arc<AppState>>,
    caller: Coordinator,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    toggle_active(&state, &caller, req.email, false)
}

pub async fn set_coordinator(
    State(state): State<Arc<AppState>>,
    _caller: Coordinator,
    Json(req): Json<SetCoordinatorRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    if !roster::set_coordinator(&state.db, &req.email, true)? {
        return Err(ApiError::InvalidCredentials);
    }
    Ok(JSend::success(MessageResponse::new("coordinator granted")))
}

pub async fn unset_coordinator(
    State(state): State<Arc<AppState>>,
    _caller: Coordinator,
    Json(req): Json<SetCoordinatorRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    if !roster::set_coordinator(&state.db, &req.email, false)? {
        return Err(ApiError::InvalidCredentials);
    }
    Ok(JSend::success(MessageResponse::new("coordinator revoked")))
}

pub async fn is_coordinator(caller: Coordinator) -> Json<JSend<IdentityResponse>> {
    JSend::success(IdentityResponse {
        email: caller.tutor.email,
    })
}

pub async fn list_tutors(
    State(state): State<Arc<AppState>>,
    _caller: Coordinator,
) -> Result<Json<JSend<Vec<TutorSummaryResponse>>>, ApiError> {
    let tutors = roster::all(&state.db)?;
    Ok(JSend::success(tutors.iter().map(tutor_to_summary).collect()))
}

// ============================================================================
// Helpers
// ============================================================================

fn toggle_active(
    state: &AppState,
    caller: &Coordinator,
    target: Option<String>,
    active: bool,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    let email = target.unwrap_or_else(|| caller.tutor.email.clone());
    match roster::set_active(&state.db, &email, active) {
        Ok(_) => Ok(JSend::success(MessageResponse::new(if active {
            "tutor activated"
        } else {
            "tutor deactivated"
        }))),
        Err(PairingError::TutorNotFound) => Err(ApiError::InvalidCredentials),
        Err(e) => Err(e.into()),
    }
}

fn tutor_to_summary(tutor: &Tutor) -> TutorSummaryResponse {
    TutorSummaryResponse {
        active: tutor.active,
        coordinator: tutor.coordinator,
        current_request: tutor.current_request.clone(),
        email: tutor.email.clone(),
        id: tutor.id.clone(),
        name: tutor.name.clone(),
    }
}
