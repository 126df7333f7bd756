use redb::{Database as RedbDatabase, ReadTransaction, ReadableTable, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::models::{HelpRequest, Tutor};
use super::tables::*;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Redb(#[from] redb::Error),
    #[error("Database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
}

/// A conditional transition found the records in an unexpected state.
///
/// The write transaction is abandoned without committing, so nothing is
/// partially applied.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("tutor is already helping a request")]
    AlreadyHelping,
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("tutor has no request in progress")]
    NotHelping,
    #[error("tutor not found")]
    TutorNotFound,
    #[error("request is not in the expected state")]
    Unavailable,
}

#[derive(Clone)]
pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("tutor-queue.redb");
        let db = RedbDatabase::create(db_path)?;

        // Create tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TUTORS)?;
            let _ = write_txn.open_table(TUTOR_EMAILS)?;
            let _ = write_txn.open_table(COURSES)?;
            let _ = write_txn.open_table(REQUESTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }
}

// ============================================================================
// Record access within a pending write transaction
// ============================================================================

pub(super) fn read_tutor(txn: &WriteTransaction, id: &str) -> Result<Option<Tutor>, DatabaseError> {
    let table = txn.open_table(TUTORS)?;
    let result = match table.get(id)? {
        Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
        None => Ok(None),
    };
    result
}

pub(super) fn write_tutor(txn: &WriteTransaction, tutor: &Tutor) -> Result<(), DatabaseError> {
    let mut table = txn.open_table(TUTORS)?;
    let data = bincode::serialize(tutor)?;
    table.insert(tutor.id.as_str(), data.as_slice())?;
    Ok(())
}

pub(super) fn tutor_id_by_email(
    txn: &WriteTransaction,
    email: &str,
) -> Result<Option<String>, DatabaseError> {
    let table = txn.open_table(TUTOR_EMAILS)?;
    let result = match table.get(email)? {
        Some(id) => Ok(Some(id.value().to_string())),
        None => Ok(None),
    };
    result
}

pub(super) fn read_request(
    txn: &WriteTransaction,
    id: &str,
) -> Result<Option<HelpRequest>, DatabaseError> {
    let table = txn.open_table(REQUESTS)?;
    let result = match table.get(id)? {
        Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
        None => Ok(None),
    };
    result
}

pub(super) fn write_request(
    txn: &WriteTransaction,
    request: &HelpRequest,
) -> Result<(), DatabaseError> {
    let mut table = txn.open_table(REQUESTS)?;
    let data = bincode::serialize(request)?;
    table.insert(request.id.as_str(), data.as_slice())?;
    Ok(())
}
