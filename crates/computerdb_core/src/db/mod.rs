//! SQLite storage bootstrap and connection lifecycle.
//!
//! # Responsibility
//! - Describe where the store lives (`StoreConfig`).
//! - Open and configure the single logical SQLite connection.
//! - Lend that connection to data access code and release it safely.
//!
//! # Invariants
//! - The schema is ensured before any connection is handed out.
//! - Every lease is released on every exit path, including early returns.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

mod open;
pub mod provider;
mod schema;

pub use open::open_store;
pub use provider::{ConnectionLease, ConnectionProvider, ReleaseFailure};

/// Environment variable consulted by [`StoreConfig::from_env`].
pub const DATABASE_ENV_VAR: &str = "COMPUTERDB_DATABASE";

const MEMORY_LOCATION: &str = ":memory:";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Physical location of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file; created on first open.
    File(PathBuf),
    /// Private in-memory database living as long as its connection.
    Memory,
}

impl StoreLocation {
    /// Parses a location string; `:memory:` selects an in-memory store.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            MEMORY_LOCATION => Self::Memory,
            other => Self::File(PathBuf::from(other)),
        }
    }

    pub(crate) fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

impl Display for StoreLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(MEMORY_LOCATION),
        }
    }
}

/// Connection settings for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Reads the store location from `COMPUTERDB_DATABASE`.
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn from_env() -> Option<Self> {
        let value = std::env::var(DATABASE_ENV_VAR).ok()?;
        if value.trim().is_empty() {
            return None;
        }
        Some(Self {
            location: StoreLocation::parse(&value),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        })
    }
}

/// Failure to obtain or manage the store connection.
#[derive(Debug)]
pub enum ConnectionError {
    /// The store could not be opened at all.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// The connection opened but pragma or schema setup failed.
    Bootstrap(rusqlite::Error),
    /// A lease was used after it had been released.
    Released,
    /// Closing the physical connection failed.
    Close(rusqlite::Error),
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open store `{target}`: {source}")
            }
            Self::Bootstrap(err) => write!(f, "store bootstrap failed: {err}"),
            Self::Released => f.write_str("connection lease already released"),
            Self::Close(err) => write!(f, "failed to close store connection: {err}"),
        }
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Bootstrap(err) => Some(err),
            Self::Released => None,
            Self::Close(err) => Some(err),
        }
    }
}
