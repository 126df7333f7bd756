use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::extract::AuthedTutor;
use crate::api::response::{ApiError, JSend, MessageResponse};
use crate::queue::{self, NewRequest};
use crate::storage::models::{HelpRequest, RequestStatus, Tutor};
use crate::AppState;

/// How many requests the history endpoint returns
const RECENT_LIMIT: usize = 10;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Course selector from the public form, "CODE - Name"
    pub course: String,
    pub description: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub professor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpActionRequest {
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentActionRequest {
    pub category: String,
    pub comment: String,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub acquired: Option<String>,
    pub category: Option<String>,
    pub comment: Option<String>,
    pub completed: Option<String>,
    pub course: Option<CourseSnapshotResponse>,
    pub description: String,
    pub email: String,
    pub id: String,
    pub name: String,
    pub professor: Option<String>,
    pub status: RequestStatus,
    pub submitted: String,
    pub tutor: Option<TutorRefResponse>,
}

#[derive(Debug, Serialize)]
pub struct CourseSnapshotResponse {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TutorRefResponse {
    pub id: String,
    pub name: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    let course_code = req
        .course
        .split(" - ")
        .next()
        .unwrap_or(req.course.as_str())
        .trim()
        .to_string();

    queue::submit(
        &state.db,
        NewRequest {
            course_code,
            description: req.description,
            email: req.email,
            name: req.name,
            professor: req.professor,
        },
    )?;

    Ok(JSend::success(MessageResponse::new("request received")))
}

pub async fn help(
    State(state): State<Arc<AppState>>,
    tutor: AuthedTutor,
    Json(req): Json<HelpActionRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    let tutor = resolve_tutor(&state, &tutor.email)?;
    queue::help(&state.db, &tutor, &req.request_id)?;
    Ok(JSend::success(MessageResponse::new(
        "request has successfully been picked up",
    )))
}

pub async fn complete(
    State(state): State<Arc<AppState>>,
    tutor: AuthedTutor,
    Json(req): Json<HelpActionRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    let tutor = resolve_tutor(&state, &tutor.email)?;
    queue::complete(&state.db, &tutor, &req.request_id)?;
    Ok(JSend::success(MessageResponse::new(
        "request is ready for commenting",
    )))
}

pub async fn comment(
    State(state): State<Arc<AppState>>,
    tutor: AuthedTutor,
    Json(req): Json<CommentActionRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    let tutor = resolve_tutor(&state, &tutor.email)?;
    queue::comment(&state.db, &tutor, &req.request_id, &req.category, &req.comment)?;
    Ok(JSend::success(MessageResponse::new(
        "request has successfully been completed",
    )))
}

pub async fn list_queue(
    State(state): State<Arc<AppState>>,
    _tutor: AuthedTutor,
) -> Result<Json<JSend<Vec<RequestResponse>>>, ApiError> {
    let requests = queue::waiting(&state.db)?;
    Ok(JSend::success(
        requests.iter().map(request_to_response).collect(),
    ))
}

pub async fn list_recent(
    State(state): State<Arc<AppState>>,
    _tutor: AuthedTutor,
) -> Result<Json<JSend<Vec<RequestResponse>>>, ApiError> {
    let requests = queue::recent(&state.db, RECENT_LIMIT)?;
    Ok(JSend::success(
        requests.iter().map(request_to_response).collect(),
    ))
}

pub async fn currently_helping(
    State(state): State<Arc<AppState>>,
    tutor: AuthedTutor,
) -> Result<Json<JSend<Option<RequestResponse>>>, ApiError> {
    let tutor = resolve_tutor(&state, &tutor.email)?;
    let current = queue::currently_helping(&state.db, &tutor)?;
    Ok(JSend::success(current.as_ref().map(request_to_response)))
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve a verified session email to its tutor record.
///
/// A session whose account has vanished is a broken invariant, not a client
/// error.
fn resolve_tutor(state: &AppState, email: &str) -> Result<Tutor, ApiError> {
    state
        .db
        .get_tutor_by_email(email)?
        .ok_or_else(|| ApiError::internal(format!("no tutor record for {email}")))
}

fn request_to_response(request: &HelpRequest) -> RequestResponse {
    RequestResponse {
        acquired: request.acquired.map(|t| t.to_rfc3339()),
        category: request.category.clone(),
        comment: request.comment.clone(),
        completed: request.completed.map(|t| t.to_rfc3339()),
        course: request.course.as_ref().map(|c| CourseSnapshotResponse {
            code: c.code.clone(),
            name: c.name.clone(),
        }),
        description: request.description.clone(),
        email: request.email.clone(),
        id: request.id.clone(),
        name: request.name.clone(),
        professor: request.professor.clone(),
        status: request.status,
        submitted: request.submitted.to_rfc3339(),
        tutor: request.tutor.as_ref().map(|t| TutorRefResponse {
            id: t.id.clone(),
            name: t.name.clone(),
        }),
    }
}
