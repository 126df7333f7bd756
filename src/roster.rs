//! Tutor availability and the coordinator privilege bit.

use chrono::Utc;

use crate::storage::models::{HelpRequest, Tutor};
use crate::storage::{Database, DatabaseError, PairingError};

/// Toggle a tutor's active flag.
///
/// Deactivating a tutor who is mid-request force-completes that request —
/// the one transition that may jump straight to COMPLETED, and the only one
/// triggered by someone other than the paired tutor. Returns the
/// force-completed request, if any.
pub fn set_active(
    db: &Database,
    email: &str,
    active: bool,
) -> Result<Option<HelpRequest>, PairingError> {
    let forced = db.set_tutor_active(email, active, Utc::now())?;
    if let Some(ref request) = forced {
        tracing::warn!(
            request_id = %request.id,
            tutor_email = %email,
            "Force-completed request on deactivation"
        );
    }
    tracing::info!(tutor_email = %email, active, "Tutor availability changed");
    Ok(forced)
}

/// Grant or revoke the coordinator bit. Returns false if the email is unknown.
pub fn set_coordinator(
    db: &Database,
    email: &str,
    coordinator: bool,
) -> Result<bool, DatabaseError> {
    let updated = db.set_tutor_coordinator(email, coordinator)?;
    if updated {
        tracing::info!(tutor_email = %email, coordinator, "Coordinator bit changed");
    }
    Ok(updated)
}

/// Every registered tutor, ordered by email, for the coordinator roster view.
pub fn all(db: &Database) -> Result<Vec<Tutor>, DatabaseError> {
    let mut tutors = db.all_tutors()?;
    tutors.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(tutors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::RequestStatus;
    use crate::testutil::{make_request, make_tutor, setup_db};

    #[test]
    fn test_deactivation_reconciles_in_flight_work() {
        let (db, _temp) = setup_db();
        db.create_tutor(&make_tutor("t1", "ada@example.edu")).unwrap();
        db.insert_request(&make_request("r1")).unwrap();
        db.acquire_request("r1", "t1", Utc::now()).unwrap();

        let forced = set_active(&db, "ada@example.edu", false).unwrap().unwrap();
        assert_eq!(forced.status, RequestStatus::Completed);

        // Reactivation does not resurrect the pairing
        assert!(set_active(&db, "ada@example.edu", true).unwrap().is_none());
        let tutor = db.get_tutor("t1").unwrap().unwrap();
        assert!(tutor.active);
        assert!(tutor.current_request.is_none());
    }

    #[test]
    fn test_set_active_unknown_tutor() {
        let (db, _temp) = setup_db();
        assert!(matches!(
            set_active(&db, "ghost@example.edu", false),
            Err(PairingError::TutorNotFound)
        ));
    }

    #[test]
    fn test_coordinator_bit_flips() {
        let (db, _temp) = setup_db();
        db.create_tutor(&make_tutor("t1", "ada@example.edu")).unwrap();

        assert!(set_coordinator(&db, "ada@example.edu", true).unwrap());
        assert!(db.get_tutor("t1").unwrap().unwrap().coordinator);

        assert!(set_coordinator(&db, "ada@example.edu", false).unwrap());
        assert!(!db.get_tutor("t1").unwrap().unwrap().coordinator);

        assert!(!set_coordinator(&db, "ghost@example.edu", true).unwrap());
    }

    #[test]
    fn test_roster_listing_is_ordered_by_email() {
        let (db, _temp) = setup_db();
        db.create_tutor(&make_tutor("t1", "grace@example.edu")).unwrap();
        db.create_tutor(&make_tutor("t2", "ada@example.edu")).unwrap();

        let emails: Vec<String> = all(&db).unwrap().into_iter().map(|t| t.email).collect();
        assert_eq!(emails, vec!["ada@example.edu", "grace@example.edu"]);
    }
}
