use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{
    read_request, read_tutor, write_request, write_tutor, Database, DatabaseError, PairingError,
};
use super::models::{HelpRequest, RequestStatus, TutorRef};
use super::tables::*;

impl Database {
    // ========================================================================
    // Request operations
    // ========================================================================

    /// Store a newly submitted request
    pub fn insert_request(&self, request: &HelpRequest) -> Result<(), DatabaseError> {
        debug_assert!(!request.id.is_empty(), "request id must not be empty");

        let write_txn = self.begin_write()?;
        write_request(&write_txn, request)?;
        write_txn.commit()?;
        Ok(())
    }

    /// Get a request by id
    pub fn get_request(&self, id: &str) -> Result<Option<HelpRequest>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(REQUESTS)?;

        match table.get(id)? {
            Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
            None => Ok(None),
        }
    }

    /// All WAITING requests, oldest first
    pub fn waiting_requests(&self) -> Result<Vec<HelpRequest>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(REQUESTS)?;

        let mut requests = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let request: HelpRequest = bincode::deserialize(value.value())?;
            if request.status == RequestStatus::Waiting {
                requests.push(request);
            }
        }

        requests.sort_by_key(|r| r.submitted);
        Ok(requests)
    }

    /// The `limit` most recently submitted requests of any status, newest first
    pub fn recent_requests(&self, limit: usize) -> Result<Vec<HelpRequest>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(REQUESTS)?;

        let mut requests = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let request: HelpRequest = bincode::deserialize(value.value())?;
            requests.push(request);
        }

        requests.sort_by(|a, b| b.submitted.cmp(&a.submitted));
        requests.truncate(limit);
        Ok(requests)
    }

    // ========================================================================
    // Conditional lifecycle transitions
    //
    // Each transition is a single write transaction that re-checks the
    // expected state of both records before writing. redb serializes write
    // transactions, so two tutors racing for the same request resolve to
    // exactly one winner; the loser sees `Unavailable`.
    // ========================================================================

    /// WAITING -> IN_PROGRESS: pair the request with the tutor.
    pub fn acquire_request(
        &self,
        request_id: &str,
        tutor_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HelpRequest, PairingError> {
        let write_txn = self.begin_write()?;
        let mut tutor = read_tutor(&write_txn, tutor_id)?.ok_or(PairingError::TutorNotFound)?;
        if tutor.current_request.is_some() {
            return Err(PairingError::AlreadyHelping);
        }

        let mut request =
            read_request(&write_txn, request_id)?.ok_or(PairingError::Unavailable)?;
        if request.status != RequestStatus::Waiting || request.tutor.is_some() {
            return Err(PairingError::Unavailable);
        }

        request.acquired = Some(now);
        request.status = RequestStatus::InProgress;
        request.tutor = Some(TutorRef {
            id: tutor.id.clone(),
            name: tutor.name.clone(),
        });
        tutor.current_request = Some(request.id.clone());

        write_request(&write_txn, &request)?;
        write_tutor(&write_txn, &tutor)?;
        write_txn.commit().map_err(DatabaseError::from)?;
        Ok(request)
    }

    /// IN_PROGRESS -> COMMENTING: mark the help session finished.
    ///
    /// The pairing is kept through the commenting phase; only the target
    /// request's timestamps and status change.
    pub fn begin_commenting(
        &self,
        request_id: &str,
        tutor_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HelpRequest, PairingError> {
        let write_txn = self.begin_write()?;
        let tutor = read_tutor(&write_txn, tutor_id)?.ok_or(PairingError::TutorNotFound)?;
        if tutor.current_request.is_none() {
            return Err(PairingError::NotHelping);
        }
        if tutor.current_request.as_deref() != Some(request_id) {
            return Err(PairingError::Unavailable);
        }

        let mut request =
            read_request(&write_txn, request_id)?.ok_or(PairingError::Unavailable)?;
        if request.status != RequestStatus::InProgress {
            return Err(PairingError::Unavailable);
        }

        request.completed = Some(now);
        request.status = RequestStatus::Commenting;

        write_request(&write_txn, &request)?;
        write_txn.commit().map_err(DatabaseError::from)?;
        Ok(request)
    }

    /// COMMENTING -> COMPLETED: store the writeup and release the pairing.
    ///
    /// The one point in the normal flow where the tutor becomes free again.
    pub fn close_request(
        &self,
        request_id: &str,
        tutor_id: &str,
        category: &str,
        comment: &str,
    ) -> Result<HelpRequest, PairingError> {
        let write_txn = self.begin_write()?;
        let mut tutor = read_tutor(&write_txn, tutor_id)?.ok_or(PairingError::TutorNotFound)?;
        if tutor.current_request.is_none() {
            return Err(PairingError::NotHelping);
        }
        if tutor.current_request.as_deref() != Some(request_id) {
            return Err(PairingError::Unavailable);
        }

        let mut request =
            read_request(&write_txn, request_id)?.ok_or(PairingError::Unavailable)?;
        if request.status != RequestStatus::Commenting {
            return Err(PairingError::Unavailable);
        }

        request.category = Some(category.to_string());
        request.comment = Some(comment.to_string());
        request.status = RequestStatus::Completed;
        tutor.current_request = None;

        write_request(&write_txn, &request)?;
        write_tutor(&write_txn, &tutor)?;
        write_txn.commit().map_err(DatabaseError::from)?;
        Ok(request)
    }
}
