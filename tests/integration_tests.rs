//! End-to-end integration tests over the storage and domain layers.

use chrono::Utc;
use tempfile::TempDir;

use tutor_queue::queue::{self, NewRequest};
use tutor_queue::roster;
use tutor_queue::storage::models::{Course, HelpRequest, RequestStatus, Tutor};
use tutor_queue::storage::{Database, PairingError};
use tutor_queue::auth::reset;

fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

fn make_tutor(id: &str, email: &str) -> Tutor {
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

fn make_request(id: &str) -> HelpRequest {
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

#[test]
fn test_full_lifecycle_scenario() {
    let (db, _temp) = setup_db();

    db.put_course(&Course {
        active: true,
        code: "CSC101".to_string(),
        id: "c1".to_string(),
        name: "Intro to Programming".to_string(),
    })
    .unwrap();
    db.create_tutor(&make_tutor("t1", "ada@example.edu")).unwrap();

    // Student submits a request for CSC101
    let request = queue::submit(
        &db,
        NewRequest {
            course_code: "CSC101".to_string(),
            description: "segfault in assignment 3".to_string(),
            email: "student@example.edu".to_string(),
            name: "Student".to_string(),
            professor: None,
        },
    )
    .unwrap();

    let waiting = queue::waiting(&db).unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].id, request.id);

    // Tutor picks it up
    let tutor = db.get_tutor("t1").unwrap().unwrap();
    queue::help(&db, &tutor, &request.id).unwrap();
    assert!(queue::waiting(&db).unwrap().is_empty());

    let tutor = db.get_tutor("t1").unwrap().unwrap();
    let current = queue::currently_helping(&db, &tutor).unwrap().unwrap();
    assert_eq!(current.id, request.id);
    assert_eq!(current.status, RequestStatus::InProgress);

    // Hand off to commenting, then close out
    queue::complete(&db, &tutor, &request.id).unwrap();
    assert_eq!(
        db.get_request(&request.id).unwrap().unwrap().status,
        RequestStatus::Commenting
    );

    queue::comment(&db, &tutor, &request.id, "Debugging", "fixed off-by-one").unwrap();

    let stored = db.get_request(&request.id).unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Completed);
    assert_eq!(stored.category.as_deref(), Some("Debugging"));
    assert_eq!(stored.comment.as_deref(), Some("fixed off-by-one"));
    assert_eq!(stored.course.as_ref().unwrap().code, "CSC101");
    assert!(stored.acquired.is_some());
    assert!(stored.completed.is_some());
    // History keeps the tutor on the completed record
    assert_eq!(stored.tutor.as_ref().unwrap().id, "t1");

    let tutor = db.get_tutor("t1").unwrap().unwrap();
    assert!(tutor.current_request.is_none());
}

#[test]
fn test_two_tutors_racing_for_one_request() {
    let (db, _temp) = setup_db();
    db.create_tutor(&make_tutor("t1", "ada@example.edu")).unwrap();
    db.create_tutor(&make_tutor("t2", "grace@example.edu")).unwrap();
    db.insert_request(&make_request("r1")).unwrap();

    let results: Vec<Result<HelpRequest, PairingError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["t1", "t2"]
            .into_iter()
            .map(|tutor_id| {
                let db = db.clone();
                scope.spawn(move || db.acquire_request("r1", tutor_id, Utc::now()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);

    // Exactly one of the two pairings holds, never both, never neither
    let t1 = db.get_tutor("t1").unwrap().unwrap();
    let t2 = db.get_tutor("t2").unwrap().unwrap();
    let paired: Vec<&Tutor> = [&t1, &t2]
        .into_iter()
        .filter(|t| t.current_request.as_deref() == Some("r1"))
        .collect();
    assert_eq!(paired.len(), 1);

    let request = db.get_request("r1").unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::InProgress);
    assert_eq!(request.tutor.as_ref().unwrap().id, paired[0].id);
}

#[test]
fn test_many_tutors_racing_for_one_request() {
    let (db, _temp) = setup_db();
    db.insert_request(&make_request("r1")).unwrap();

    let tutor_ids: Vec<String> = (0..8).map(|i| format!("t{i}")).collect();
    for (i, id) in tutor_ids.iter().enumerate() {
        db.create_tutor(&make_tutor(id, &format!("tutor{i}@example.edu")))
            .unwrap();
    }

    let results: Vec<Result<HelpRequest, PairingError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = tutor_ids
            .iter()
            .map(|tutor_id| {
                let db = db.clone();
                scope.spawn(move || db.acquire_request("r1", tutor_id, Utc::now()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    // Every loser observed the stricter unavailability error
    for result in &results {
        if let Err(e) = result {
            assert!(matches!(e, PairingError::Unavailable));
        }
    }

    let paired: Vec<String> = tutor_ids
        .iter()
        .filter(|id| {
            db.get_tutor(id)
                .unwrap()
                .unwrap()
                .current_request
                .as_deref()
                == Some("r1")
        })
        .cloned()
        .collect();
    assert_eq!(paired.len(), 1);
}

#[test]
fn test_force_completion_on_deactivation() {
    let (db, _temp) = setup_db();
    db.create_tutor(&make_tutor("t1", "ada@example.edu")).unwrap();
    db.insert_request(&make_request("r1")).unwrap();

    let tutor = db.get_tutor("t1").unwrap().unwrap();
    queue::help(&db, &tutor, "r1").unwrap();

    let forced = roster::set_active(&db, "ada@example.edu", false)
        .unwrap()
        .expect("expected a force-completed request");
    assert_eq!(forced.id, "r1");
    assert_eq!(forced.status, RequestStatus::Completed);
    assert_eq!(forced.category.as_deref(), Some("OTHER"));
    assert_eq!(forced.comment.as_deref(), Some("N/A"));
    assert!(forced.completed.is_some());

    let tutor = db.get_tutor("t1").unwrap().unwrap();
    assert!(!tutor.active);
    assert!(tutor.current_request.is_none());
}

#[test]
fn test_force_completion_during_commenting_keeps_completed_timestamp() {
    let (db, _temp) = setup_db();
    db.create_tutor(&make_tutor("t1", "ada@example.edu")).unwrap();
    db.insert_request(&make_request("r1")).unwrap();

    let tutor = db.get_tutor("t1").unwrap().unwrap();
    queue::help(&db, &tutor, "r1").unwrap();
    let commenting = queue::complete(&db, &tutor, "r1").unwrap();
    let handed_off = commenting.completed.unwrap();

    let forced = roster::set_active(&db, "ada@example.edu", false)
        .unwrap()
        .unwrap();
    // The hand-off timestamp survives the force-completion
    assert_eq!(forced.completed, Some(handed_off));
    assert_eq!(forced.status, RequestStatus::Completed);
}

#[test]
fn test_lifecycle_never_skips_or_regresses() {
    let (db, _temp) = setup_db();
    db.create_tutor(&make_tutor("t1", "ada@example.edu")).unwrap();
    db.insert_request(&make_request("r1")).unwrap();

    let tutor = db.get_tutor("t1").unwrap().unwrap();

    // WAITING cannot jump to COMMENTING or COMPLETED
    assert!(queue::complete(&db, &tutor, "r1").is_err());
    assert!(queue::comment(&db, &tutor, "r1", "Other", "n/a").is_err());

    queue::help(&db, &tutor, "r1").unwrap();
    let tutor = db.get_tutor("t1").unwrap().unwrap();

    // IN_PROGRESS cannot be re-acquired or closed without commenting
    assert!(matches!(
        db.acquire_request("r1", "t1", Utc::now()),
        Err(PairingError::AlreadyHelping)
    ));
    assert!(queue::comment(&db, &tutor, "r1", "Other", "n/a").is_err());

    queue::complete(&db, &tutor, "r1").unwrap();

    // COMMENTING cannot be completed again
    assert!(queue::complete(&db, &tutor, "r1").is_err());

    queue::comment(&db, &tutor, "r1", "Other", "wrapped up").unwrap();

    // COMPLETED is terminal
    let tutor = db.get_tutor("t1").unwrap().unwrap();
    assert!(queue::complete(&db, &tutor, "r1").is_err());
    assert_eq!(
        db.get_request("r1").unwrap().unwrap().status,
        RequestStatus::Completed
    );
}

#[test]
fn test_reset_protocol_round_trip_and_replay() {
    let (db, _temp) = setup_db();
    db.create_tutor(&make_tutor("t1", "ada@example.edu")).unwrap();

    let signing_key = "test-signing-key";
    let tutor = db.get_tutor("t1").unwrap().unwrap();
    let token = reset::issue(signing_key, &tutor, 20).unwrap();

    // First use lands
    let claims = reset::verify(signing_key, &tutor, &token).unwrap();
    assert!(db
        .store_password_hash("t1", "new-digest", claims.generation)
        .unwrap());

    // Replaying the same token within its window fails: the stored
    // generation has moved past the signed one
    let tutor = db.get_tutor("t1").unwrap().unwrap();
    assert!(reset::verify(signing_key, &tutor, &token).is_err());
    assert!(!db
        .store_password_hash("t1", "hijacked-digest", claims.generation)
        .unwrap());
    assert_eq!(
        db.get_tutor("t1").unwrap().unwrap().password_hash,
        "new-digest"
    );
}

#[test]
fn test_reset_token_is_useless_against_another_tutor() {
    let (db, _temp) = setup_db();
    db.create_tutor(&make_tutor("t1", "ada@example.edu")).unwrap();
    db.create_tutor(&make_tutor("t2", "grace@example.edu")).unwrap();

    let signing_key = "test-signing-key";
    let ada = db.get_tutor("t1").unwrap().unwrap();
    let grace = db.get_tutor("t2").unwrap().unwrap();

    let token = reset::issue(signing_key, &ada, 20).unwrap();
    assert!(reset::verify(signing_key, &grace, &token).is_err());
}
