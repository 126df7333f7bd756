use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::extract::Coordinator;
use crate::api::response::{ApiError, JSend, MessageResponse};
use crate::storage::models::Course;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpsertCourseRequest {
    #[serde(default = "default_active")]
    pub active: bool,
    pub code: String,
    pub name: String,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub active: bool,
    pub code: String,
    pub id: String,
    pub name: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<CourseResponse>>>, ApiError> {
    let courses = state.db.all_courses()?;
    Ok(JSend::success(
        courses.iter().map(course_to_response).collect(),
    ))
}

pub async fn upsert_course(
    State(state): State<Arc<AppState>>,
    _caller: Coordinator,
    Json(req): Json<UpsertCourseRequest>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    // Keep the existing id when the code is already in the catalog
    let id = state
        .db
        .get_course(&req.code)?
        .map(|c| c.id)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let course = Course {
        active: req.active,
        code: req.code,
        id,
        name: req.name,
    };
    state.db.put_course(&course)?;

    tracing::info!(code = %course.code, "Course saved");
    Ok(JSend::success(MessageResponse::new("course saved")))
}

// ============================================================================
// Helpers
// ============================================================================

fn course_to_response(course: &Course) -> CourseResponse {
    CourseResponse {
        active: course.active,
        code: course.code.clone(),
        id: course.id.clone(),
        name: course.name.clone(),
    }
}
