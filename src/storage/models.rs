use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a help request.
///
/// Requests move WAITING -> IN_PROGRESS -> COMMENTING -> COMPLETED, never
/// backward. Deactivating a tutor mid-request is the one transition allowed
/// to jump straight to COMPLETED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Waiting,
    InProgress,
    Commenting,
    Completed,
}

/// A registered tutor account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tutor {
    /// Login and pairing are only permitted while true
    pub active: bool,
    /// Gates the privileged roster and catalog operations
    pub coordinator: bool,
    pub created_at: DateTime<Utc>,
    /// Id of the request this tutor currently owns, if any
    pub current_request: Option<String>,
    pub email: String,
    pub id: String,
    pub name: String,
    /// Argon2 PHC string; the plaintext is never stored
    pub password_hash: String,
    /// Signed into reset tokens and bumped on every successful reset, so a
    /// consumed token cannot be replayed within its validity window
    pub reset_generation: u64,
}

/// A course offered for tutoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub active: bool,
    pub code: String,
    pub id: String,
    pub name: String,
}

/// Course fields copied onto a request at submission time.
///
/// An owned value, not a reference — later catalog edits must not alter
/// submitted history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSnapshot {
    pub code: String,
    pub name: String,
}

/// Tutor fields embedded on a request when it is picked up.
///
/// Retained after completion for history even though the live pairing is
/// dissolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorRef {
    pub id: String,
    pub name: String,
}

/// A student's help request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpRequest {
    /// Set when a tutor picks the request up
    pub acquired: Option<DateTime<Utc>>,
    /// Set on the COMMENTING -> COMPLETED transition
    pub category: Option<String>,
    pub comment: Option<String>,
    /// Set on hand-off to commenting
    pub completed: Option<DateTime<Utc>>,
    pub course: Option<CourseSnapshot>,
    pub description: String,
    pub email: String,
    pub id: String,
    pub name: String,
    pub professor: Option<String>,
    pub status: RequestStatus,
    pub submitted: DateTime<Utc>,
    pub tutor: Option<TutorRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::from_str::<RequestStatus>("\"WAITING\"").unwrap(),
            RequestStatus::Waiting
        );
    }
}
