//! tutor-queue - Coordination service for a walk-in tutoring center
//!
//! This crate pairs a live queue of student help requests with a pool of
//! tutors:
//! - Append-only request lifecycle: WAITING -> IN_PROGRESS -> COMMENTING -> COMPLETED
//! - Conditional (compare-and-set) transitions, so tutors racing for the
//!   same request resolve to exactly one winner
//! - Stateless HS256 session tokens, argon2id credential hashing
//! - Per-user-keyed password reset tokens with replay protection
//! - redb embedded database (ACID, MVCC, crash-safe)
//! - REST API

pub mod api;
pub mod auth;
pub mod config;
pub mod mail;
pub mod queue;
pub mod roster;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use auth::{CredentialHasher, SessionSigner};
use config::Config;
use mail::Mailer;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub credentials: CredentialHasher,
    pub db: Database,
    pub mailer: Arc<dyn Mailer>,
    pub sessions: SessionSigner,
}
