mod courses;
pub mod db;
pub mod models;
mod requests;
mod tables;
mod tutors;

pub use db::{Database, DatabaseError, PairingError};
pub use tables::*;
