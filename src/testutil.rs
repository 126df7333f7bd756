//! Shared test helpers — available to all `#[cfg(test)]` modules in the crate.

use chrono::Utc;
use tempfile::TempDir;

use crate::storage::models::{Course, HelpRequest, RequestStatus, Tutor};
use crate::storage::Database;

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard — the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// Create an active, non-coordinator `Tutor` with the given id and email.
pub fn make_tutor(id: &str, email: &str) -> Tutor {
    Tutor {
        active: true,
        coordinator: false,
        created_at: Utc::now(),
        current_request: None,
        email: email.to_string(),
        id: id.to_string(),
        name: format!("Tutor {id}"),
        password_hash: "unverifiable-digest".to_string(),
        reset_generation: 0,
    }
}

/// Create a WAITING `HelpRequest` with the given id.
pub fn make_request(id: &str) -> HelpRequest {
    HelpRequest {
        acquired: None,
        category: None,
        comment: None,
        completed: None,
        course: None,
        description: "help with recursion".to_string(),
        email: "student@example.edu".to_string(),
        id: id.to_string(),
        name: "Student".to_string(),
        professor: None,
        status: RequestStatus::Waiting,
        submitted: Utc::now(),
        tutor: None,
    }
}

/// Create an active `Course` with the given code and name.
pub fn make_course(code: &str, name: &str) -> Course {
    Course {
        active: true,
        code: code.to_string(),
        id: format!("course-{code}"),
        name: name.to_string(),
    }
}
