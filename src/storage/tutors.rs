use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{
    read_request, read_tutor, tutor_id_by_email, write_request, write_tutor, Database,
    DatabaseError, PairingError,
};
use super::models::{HelpRequest, RequestStatus, Tutor};
use super::tables::*;

impl Database {
    // ========================================================================
    // Tutor operations
    // ========================================================================

    /// Insert a new tutor, enforcing email uniqueness.
    ///
    /// Returns false (and writes nothing) if the email is already taken.
    pub fn create_tutor(&self, tutor: &Tutor) -> Result<bool, DatabaseError> {
        debug_assert!(!tutor.id.is_empty(), "tutor id must not be empty");
        debug_assert!(!tutor.email.is_empty(), "tutor email must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut index = write_txn.open_table(TUTOR_EMAILS)?;
            if index.get(tutor.email.as_str())?.is_some() {
                return Ok(false);
            }
            index.insert(tutor.email.as_str(), tutor.id.as_str())?;
        }
        write_tutor(&write_txn, tutor)?;
        write_txn.commit()?;
        Ok(true)
    }

    /// Get a tutor by id
    pub fn get_tutor(&self, id: &str) -> Result<Option<Tutor>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TUTORS)?;

        match table.get(id)? {
            Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
            None => Ok(None),
        }
    }

    /// Get a tutor by email (via the unique-email index)
    pub fn get_tutor_by_email(&self, email: &str) -> Result<Option<Tutor>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(TUTOR_EMAILS)?;

        let id = match index.get(email)? {
            Some(id) => id.value().to_string(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(TUTORS)?;
        match table.get(id.as_str())? {
            Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
            None => Ok(None),
        }
    }

    /// Get all tutors (for the coordinator roster view)
    pub fn all_tutors(&self) -> Result<Vec<Tutor>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TUTORS)?;

        let mut tutors = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let tutor: Tutor = bincode::deserialize(value.value())?;
            tutors.push(tutor);
        }

        Ok(tutors)
    }

    /// Store a new password hash, conditional on the reset generation still
    /// matching the one signed into the consumed token.
    ///
    /// Bumps the generation on success so the token cannot be replayed.
    /// Returns false if the tutor is missing or the generation moved.
    pub fn store_password_hash(
        &self,
        tutor_id: &str,
        hash: &str,
        expected_generation: u64,
    ) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let mut tutor = match read_tutor(&write_txn, tutor_id)? {
            Some(tutor) => tutor,
            None => return Ok(false),
        };
        if tutor.reset_generation != expected_generation {
            return Ok(false);
        }

        tutor.password_hash = hash.to_string();
        tutor.reset_generation += 1;
        write_tutor(&write_txn, &tutor)?;
        write_txn.commit()?;
        Ok(true)
    }

    /// Toggle a tutor's active flag by email.
    ///
    /// Deactivating a tutor who holds a live request force-completes that
    /// request in the same transaction: status COMPLETED, category "OTHER",
    /// comment "N/A", pairing cleared. Returns the force-completed request,
    /// if there was one.
    pub fn set_tutor_active(
        &self,
        email: &str,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, PairingError> {
        let write_txn = self.begin_write()?;
        let id = tutor_id_by_email(&write_txn, email)?.ok_or(PairingError::TutorNotFound)?;
        let mut tutor = read_tutor(&write_txn, &id)?.ok_or(PairingError::TutorNotFound)?;
        tutor.active = active;

        let mut forced = None;
        if !active {
            if let Some(request_id) = tutor.current_request.take() {
                if let Some(mut request) = read_request(&write_txn, &request_id)? {
                    if matches!(
                        request.status,
                        RequestStatus::InProgress | RequestStatus::Commenting
                    ) {
                        request.status = RequestStatus::Completed;
                        if request.completed.is_none() {
                            request.completed = Some(now);
                        }
                        request.category = Some("OTHER".to_string());
                        request.comment = Some("N/A".to_string());
                        write_request(&write_txn, &request)?;
                        forced = Some(request);
                    }
                }
            }
        }

        write_tutor(&write_txn, &tutor)?;
        write_txn.commit().map_err(DatabaseError::from)?;
        Ok(forced)
    }

    /// Flip the coordinator bit. Returns false if no tutor has the email.
    pub fn set_tutor_coordinator(
        &self,
        email: &str,
        coordinator: bool,
    ) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let id = match tutor_id_by_email(&write_txn, email)? {
            Some(id) => id,
            None => return Ok(false),
        };
        let mut tutor = match read_tutor(&write_txn, &id)? {
            Some(tutor) => tutor,
            None => return Ok(false),
        };

        tutor.coordinator = coordinator;
        write_tutor(&write_txn, &tutor)?;
        write_txn.commit()?;
        Ok(true)
    }
}
