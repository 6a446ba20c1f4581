//! Shared connection ownership and scoped release.
//!
//! # Responsibility
//! - Own the single logical store connection for the provider's lifetime.
//! - Lend it out one caller at a time through [`ConnectionLease`].
//! - Release cursor, statement and lease in that order on every exit path.
//!
//! # Invariants
//! - Access to the connection is serialized by a mutex; a lease holds the lock.
//! - Releasing a lease twice is a no-op.
//! - A failure while releasing is logged and never replaces the primary outcome.

use super::open::open_store;
use super::{ConnectionError, StoreConfig};
use crate::persistence::{PersistenceError, PersistenceResult};
use log::{debug, error, info, trace, warn};
use rusqlite::{Connection, Statement};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Owner of the shared store connection.
///
/// Construct one per store and hand it to each DAO behind an `Arc`.
/// The connection is opened eagerly by [`ConnectionProvider::open`] and
/// lazily again after [`ConnectionProvider::close`].
pub struct ConnectionProvider {
    config: StoreConfig,
    slot: Mutex<Option<Connection>>,
    leases_granted: AtomicU64,
}

impl ConnectionProvider {
    /// Opens the store and returns a provider owning its connection.
    ///
    /// # Errors
    /// - `ConnectionError::Open` when the store is unreachable.
    /// - `ConnectionError::Bootstrap` when pragma or schema setup fails.
    pub fn open(config: StoreConfig) -> Result<Self, ConnectionError> {
        let conn = open_store(&config)?;
        Ok(Self {
            config,
            slot: Mutex::new(Some(conn)),
            leases_granted: AtomicU64::new(0),
        })
    }

    /// Opens a provider over a private in-memory store.
    pub fn in_memory() -> Result<Self, ConnectionError> {
        Self::open(StoreConfig::in_memory())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of leases handed out so far.
    pub fn leases_granted(&self) -> u64 {
        self.leases_granted.load(Ordering::Relaxed)
    }

    /// Lends the shared connection, blocking while another lease is active.
    ///
    /// Reopens the store if it was closed with [`ConnectionProvider::close`].
    pub fn get_connection(&self) -> Result<ConnectionLease<'_>, ConnectionError> {
        let mut slot = self.lock_slot();
        if slot.is_none() {
            *slot = Some(open_store(&self.config)?);
        }

        let lease_id = self.leases_granted.fetch_add(1, Ordering::Relaxed) + 1;
        trace!("event=db_lease module=db status=acquired lease_id={lease_id}");
        Ok(ConnectionLease {
            guard: Some(slot),
            lease_id,
        })
    }

    /// Runs one prepared statement inside a scoped lease.
    ///
    /// `work` receives the prepared statement; any cursor it opens is dropped
    /// before it returns. Afterwards the statement is finalized and the lease
    /// released, whatever `work` returned.
    ///
    /// # Errors
    /// - `PersistenceError::Connection` when no lease can be obtained.
    /// - `PersistenceError::Store` tagged with `operation` for any failure while
    ///   preparing, executing or reading rows.
    pub fn with_statement<T, F>(
        &self,
        operation: &'static str,
        sql: &str,
        work: F,
    ) -> PersistenceResult<T>
    where
        F: FnOnce(&mut Statement<'_>) -> rusqlite::Result<T>,
    {
        let started_at = Instant::now();
        let mut lease = self.get_connection()?;
        let mut failures = Vec::new();

        let outcome = run_statement(&lease, operation, sql, work, &mut failures);
        failures.extend(lease.release());
        settle(lease.lease_id, operation, started_at, outcome, &failures)
    }

    /// Closes the physical connection. Calling it again is a no-op.
    ///
    /// An in-memory store loses its data here.
    pub fn close(&self) -> Result<(), ConnectionError> {
        let mut slot = self.lock_slot();
        let Some(conn) = slot.take() else {
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                info!(
                    "event=db_close module=db status=ok mode={}",
                    self.config.location.mode()
                );
                Ok(())
            }
            Err((conn, err)) => {
                error!(
                    "event=db_close module=db status=error mode={} error={}",
                    self.config.location.mode(),
                    err
                );
                *slot = Some(conn);
                Err(ConnectionError::Close(err))
            }
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Connection>> {
        // A panic while holding a lease leaves the connection itself usable;
        // any open transaction was rolled back when that lease dropped.
        self.slot.lock().unwrap_or_else(|poisoned| {
            warn!("event=db_lease module=db status=recovered reason=lock_poisoned");
            poisoned.into_inner()
        })
    }
}

/// Exclusive loan of the shared connection.
///
/// Released explicitly with [`ConnectionLease::release`] or implicitly on drop.
pub struct ConnectionLease<'p> {
    guard: Option<MutexGuard<'p, Option<Connection>>>,
    lease_id: u64,
}

impl ConnectionLease<'_> {
    /// Borrows the leased connection.
    ///
    /// # Errors
    /// - `ConnectionError::Released` once the lease has been released.
    pub fn connection(&self) -> Result<&Connection, ConnectionError> {
        self.guard
            .as_deref()
            .and_then(Option::as_ref)
            .ok_or(ConnectionError::Released)
    }

    pub fn is_released(&self) -> bool {
        self.guard.is_none()
    }

    /// Returns the connection to its provider.
    ///
    /// A transaction left open by the holder is rolled back first; a failing
    /// rollback is reported, not raised. Subsequent calls do nothing.
    pub fn release(&mut self) -> Option<ReleaseFailure> {
        let guard = self.guard.take()?;
        let failure = match guard.as_ref() {
            Some(conn) if !conn.is_autocommit() => conn
                .execute_batch("ROLLBACK;")
                .err()
                .map(|error| ReleaseFailure {
                    resource: "connection",
                    error,
                }),
            _ => None,
        };
        drop(guard);
        trace!(
            "event=db_lease module=db status=released lease_id={}",
            self.lease_id
        );
        failure
    }
}

impl Drop for ConnectionLease<'_> {
    fn drop(&mut self) {
        if let Some(failure) = self.release() {
            log_release_failures(self.lease_id, &[failure]);
        }
    }
}

/// Secondary failure raised while releasing a resource.
#[derive(Debug)]
pub struct ReleaseFailure {
    /// `statement` or `connection`.
    pub resource: &'static str,
    pub error: rusqlite::Error,
}

impl Display for ReleaseFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to release {}: {}", self.resource, self.error)
    }
}

fn run_statement<T, F>(
    lease: &ConnectionLease<'_>,
    operation: &'static str,
    sql: &str,
    work: F,
    failures: &mut Vec<ReleaseFailure>,
) -> PersistenceResult<T>
where
    F: FnOnce(&mut Statement<'_>) -> rusqlite::Result<T>,
{
    let conn = lease.connection()?;
    let mut stmt = conn
        .prepare(sql)
        .map_err(|source| PersistenceError::Store { operation, source })?;

    let result = work(&mut stmt);
    if let Err(error) = stmt.finalize() {
        failures.push(ReleaseFailure {
            resource: "statement",
            error,
        });
    }

    result.map_err(|source| PersistenceError::Store { operation, source })
}

fn log_release_failures(lease_id: u64, failures: &[ReleaseFailure]) {
    for failure in failures {
        warn!(
            "event=db_release module=db status=error lease_id={} resource={} error={}",
            lease_id, failure.resource, failure.error
        );
    }
}

/// Logs release failures and the operation result, then hands the primary
/// outcome back untouched.
fn settle<T>(
    lease_id: u64,
    operation: &'static str,
    started_at: Instant,
    outcome: PersistenceResult<T>,
    failures: &[ReleaseFailure],
) -> PersistenceResult<T> {
    log_release_failures(lease_id, failures);

    match &outcome {
        Ok(_) => debug!(
            "event={} module=persistence status=ok duration_ms={} release_failures={}",
            operation,
            started_at.elapsed().as_millis(),
            failures.len()
        ),
        Err(err) => error!(
            "event={} module=persistence status=error duration_ms={} error={}",
            operation,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    outcome
}
