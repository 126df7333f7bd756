//! The request lifecycle coordinator.
//!
//! A request moves WAITING -> IN_PROGRESS -> COMMENTING -> COMPLETED,
//! never backward and never skipping a step; `roster::set_active` owns the
//! one exception. Every transition runs as a conditional write transaction
//! in storage, so concurrent callers racing for the same request resolve
//! to exactly one winner and the tutor/request pairing stays consistent in
//! both directions.

use chrono::Utc;
use uuid::Uuid;

use crate::storage::models::{CourseSnapshot, HelpRequest, RequestStatus, Tutor};
use crate::storage::{Database, DatabaseError, PairingError};

/// A new submission from the public request form
#[derive(Debug)]
pub struct NewRequest {
    pub course_code: String,
    pub description: String,
    pub email: String,
    pub name: String,
    pub professor: Option<String>,
}

/// Create a WAITING request.
///
/// The course is snapshotted by value at submission time; an unknown code
/// stores no snapshot but never fails the submission.
pub fn submit(db: &Database, new: NewRequest) -> Result<HelpRequest, DatabaseError> {
    let course = db
        .get_course(&new.course_code)?
        .map(|c| CourseSnapshot {
            code: c.code,
            name: c.name,
        });

    let request = HelpRequest {
        acquired: None,
        category: None,
        comment: None,
        completed: None,
        course,
        description: new.description,
        email: new.email,
        id: Uuid::new_v4().to_string(),
        name: new.name,
        professor: new.professor,
        status: RequestStatus::Waiting,
        submitted: Utc::now(),
        tutor: None,
    };
    db.insert_request(&request)?;

    tracing::debug!(request_id = %request.id, "Request submitted");
    Ok(request)
}

/// Pair a tutor with a WAITING request.
pub fn help(db: &Database, tutor: &Tutor, request_id: &str) -> Result<HelpRequest, PairingError> {
    let request = db.acquire_request(request_id, &tutor.id, Utc::now())?;
    tracing::info!(request_id = %request.id, tutor_id = %tutor.id, "Request picked up");
    Ok(request)
}

/// Move the tutor's current request into the commenting phase.
pub fn complete(
    db: &Database,
    tutor: &Tutor,
    request_id: &str,
) -> Result<HelpRequest, PairingError> {
    let request = db.begin_commenting(request_id, &tutor.id, Utc::now())?;
    tracing::info!(request_id = %request.id, tutor_id = %tutor.id, "Request ready for commenting");
    Ok(request)
}

/// Store the writeup and release the pairing.
pub fn comment(
    db: &Database,
    tutor: &Tutor,
    request_id: &str,
    category: &str,
    text: &str,
) -> Result<HelpRequest, PairingError> {
    let request = db.close_request(request_id, &tutor.id, category, text)?;
    tracing::info!(request_id = %request.id, tutor_id = %tutor.id, "Request completed");
    Ok(request)
}

/// All WAITING requests, oldest first.
///
/// The ordering implies first-come-first-served intent; nothing stops a
/// tutor from picking any waiting item.
pub fn waiting(db: &Database) -> Result<Vec<HelpRequest>, DatabaseError> {
    db.waiting_requests()
}

/// The most recently submitted requests of any status, newest first.
pub fn recent(db: &Database, limit: usize) -> Result<Vec<HelpRequest>, DatabaseError> {
    db.recent_requests(limit)
}

/// The request the tutor currently owns, if any.
pub fn currently_helping(
    db: &Database,
    tutor: &Tutor,
) -> Result<Option<HelpRequest>, DatabaseError> {
    match tutor.current_request.as_deref() {
        Some(id) => db.get_request(id),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_course, make_tutor, setup_db};

    fn new_request(course_code: &str) -> NewRequest {
        NewRequest {
            course_code: course_code.to_string(),
            description: "help with recursion".to_string(),
            email: "student@example.edu".to_string(),
            name: "Student".to_string(),
            professor: Some("Prof. Liskov".to_string()),
        }
    }

    #[test]
    fn test_submit_snapshots_the_course() {
        let (db, _temp) = setup_db();
        db.put_course(&make_course("CSC101", "Intro to Programming")).unwrap();

        let request = submit(&db, new_request("CSC101")).unwrap();
        let snapshot = request.course.unwrap();
        assert_eq!(snapshot.code, "CSC101");
        assert_eq!(snapshot.name, "Intro to Programming");

        // Later catalog edits must not rewrite submitted history
        let mut renamed = make_course("CSC101", "Programming Fundamentals");
        renamed.id = "same".to_string();
        db.put_course(&renamed).unwrap();
        let stored = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(stored.course.unwrap().name, "Intro to Programming");
    }

    #[test]
    fn test_submit_with_unknown_course_still_succeeds() {
        let (db, _temp) = setup_db();
        let request = submit(&db, new_request("CSC999")).unwrap();
        assert!(request.course.is_none());
        assert_eq!(request.status, RequestStatus::Waiting);
    }

    #[test]
    fn test_full_lifecycle() {
        let (db, _temp) = setup_db();
        db.put_course(&make_course("CSC101", "Intro to Programming")).unwrap();
        let tutor = make_tutor("t1", "ada@example.edu");
        db.create_tutor(&tutor).unwrap();

        let request = submit(&db, new_request("CSC101")).unwrap();
        assert_eq!(waiting(&db).unwrap().len(), 1);

        help(&db, &tutor, &request.id).unwrap();
        assert!(waiting(&db).unwrap().is_empty());

        let tutor = db.get_tutor("t1").unwrap().unwrap();
        let current = currently_helping(&db, &tutor).unwrap().unwrap();
        assert_eq!(current.id, request.id);
        assert_eq!(current.status, RequestStatus::InProgress);

        complete(&db, &tutor, &request.id).unwrap();
        let current = currently_helping(&db, &tutor).unwrap().unwrap();
        assert_eq!(current.status, RequestStatus::Commenting);

        comment(&db, &tutor, &request.id, "Debugging", "fixed off-by-one").unwrap();
        let tutor = db.get_tutor("t1").unwrap().unwrap();
        assert!(currently_helping(&db, &tutor).unwrap().is_none());

        let stored = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Completed);
        assert_eq!(stored.category.as_deref(), Some("Debugging"));
    }

    #[test]
    fn test_currently_helping_none() {
        let (db, _temp) = setup_db();
        let tutor = make_tutor("t1", "ada@example.edu");
        db.create_tutor(&tutor).unwrap();
        assert!(currently_helping(&db, &tutor).unwrap().is_none());
    }
}
