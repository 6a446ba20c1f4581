//! Data access layer for computers and companies.
//!
//! # Responsibility
//! - Define the DAO contracts consumed by services and front ends.
//! - Map SQLite rows to domain entities by column name.
//! - Translate every store failure into [`PersistenceError`].
//!
//! # Invariants
//! - Each DAO call is one independent unit of work: acquire, use, release.
//! - "Not found" is `Ok(None)`, never an error.
//! - Zero affected rows on update/delete is not an error.

use crate::db::ConnectionError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod company_dao;
pub mod computer_dao;
pub mod mapper;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Failure surfaced by every DAO operation.
#[derive(Debug)]
pub enum PersistenceError {
    /// No usable connection could be obtained.
    Connection(ConnectionError),
    /// Preparing, executing or reading a statement failed.
    Store {
        operation: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "{err}"),
            Self::Store { operation, source } => write!(f, "{operation} failed: {source}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Store { source, .. } => Some(source),
        }
    }
}

impl From<ConnectionError> for PersistenceError {
    fn from(value: ConnectionError) -> Self {
        Self::Connection(value)
    }
}
