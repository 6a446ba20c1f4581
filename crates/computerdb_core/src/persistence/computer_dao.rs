//! Computer DAO contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/retrieve/update/delete for `computer` rows.
//! - Fetch the owning company through a left join in the same round trip.
//!
//! # Invariants
//! - Field values are trusted as given: no name or date-order validation here.
//! - Absent optional fields are bound as explicit SQL `NULL`.
//! - `update(None)`, `delete(None)` and `update` of a transient computer never
//!   touch the store.
//! - `delete_all` is not atomic: it stops at the first failure and keeps
//!   deletions already applied.

use crate::db::ConnectionProvider;
use crate::model::computer::{Computer, ComputerId};
use crate::persistence::mapper::{ComputerRowMapper, RowMapper};
use crate::persistence::PersistenceResult;
use log::{debug, info};
use rusqlite::params;
use std::sync::Arc;

const COMPUTER_SELECT_SQL: &str = "SELECT
    cp.id AS id,
    cp.name AS name,
    cp.introduced AS introduced,
    cp.discontinued AS discontinued,
    ca.id AS \"company.id\",
    ca.name AS \"company.name\"
FROM computer cp
LEFT JOIN company ca ON cp.company_id = ca.id";

const COMPUTER_INSERT_SQL: &str = "INSERT INTO computer (
    name,
    introduced,
    discontinued,
    company_id
) VALUES (?1, ?2, ?3, ?4)
RETURNING id;";

const COMPUTER_UPDATE_SQL: &str = "UPDATE computer
SET
    name = ?1,
    introduced = ?2,
    discontinued = ?3,
    company_id = ?4
WHERE id = ?5;";

const COMPUTER_DELETE_SQL: &str = "DELETE FROM computer WHERE id = ?1;";

/// Data access contract for computers.
pub trait ComputerDao {
    /// Inserts `computer` and stores the generated id back into it.
    fn create(&self, computer: &mut Computer) -> PersistenceResult<ComputerId>;
    /// Lists every computer with its company, in store order.
    fn retrieve_all(&self) -> PersistenceResult<Vec<Computer>>;
    /// Loads one computer; `Ok(None)` when no row matches.
    fn retrieve_one(&self, id: ComputerId) -> PersistenceResult<Option<Computer>>;
    /// Overwrites every mutable field by id. `None` is a no-op.
    fn update(&self, computer: Option<&Computer>) -> PersistenceResult<()>;
    /// Deletes one computer. `None` and unknown ids are no-ops.
    fn delete(&self, id: Option<ComputerId>) -> PersistenceResult<()>;
    /// Deletes each id in order, stopping at the first failure.
    fn delete_all(&self, ids: &[ComputerId]) -> PersistenceResult<()>;
}

/// SQLite-backed computer DAO.
pub struct SqliteComputerDao {
    provider: Arc<ConnectionProvider>,
    mapper: ComputerRowMapper,
}

impl SqliteComputerDao {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self {
            provider,
            mapper: ComputerRowMapper::new(),
        }
    }
}

impl ComputerDao for SqliteComputerDao {
    fn create(&self, computer: &mut Computer) -> PersistenceResult<ComputerId> {
        let id = self
            .provider
            .with_statement("computer_create", COMPUTER_INSERT_SQL, |stmt| {
                stmt.query_row(
                    params![
                        computer.name.as_str(),
                        computer.introduced,
                        computer.discontinued,
                        computer.company_id(),
                    ],
                    |row| row.get::<_, ComputerId>("id"),
                )
            })?;

        computer.id = Some(id);
        info!("event=computer_create module=persistence status=ok id={id}");
        Ok(id)
    }

    fn retrieve_all(&self) -> PersistenceResult<Vec<Computer>> {
        self.provider
            .with_statement("computer_retrieve_all", COMPUTER_SELECT_SQL, |stmt| {
                let mut rows = stmt.query([])?;
                self.mapper.map_rows(&mut rows)
            })
    }

    fn retrieve_one(&self, id: ComputerId) -> PersistenceResult<Option<Computer>> {
        let sql = format!("{COMPUTER_SELECT_SQL} WHERE cp.id = ?1;");
        self.provider
            .with_statement("computer_retrieve_one", &sql, |stmt| {
                let mut rows = stmt.query([id])?;
                self.mapper.map_row(&mut rows)
            })
    }

    fn update(&self, computer: Option<&Computer>) -> PersistenceResult<()> {
        let Some(computer) = computer else {
            return Ok(());
        };
        let Some(id) = computer.id else {
            debug!("event=computer_update module=persistence status=skipped reason=transient");
            return Ok(());
        };

        let changed = self
            .provider
            .with_statement("computer_update", COMPUTER_UPDATE_SQL, |stmt| {
                stmt.execute(params![
                    computer.name.as_str(),
                    computer.introduced,
                    computer.discontinued,
                    computer.company_id(),
                    id,
                ])
            })?;

        info!("event=computer_update module=persistence status=ok id={id} changed={changed}");
        Ok(())
    }

    fn delete(&self, id: Option<ComputerId>) -> PersistenceResult<()> {
        let Some(id) = id else {
            return Ok(());
        };

        let changed = self
            .provider
            .with_statement("computer_delete", COMPUTER_DELETE_SQL, |stmt| {
                stmt.execute([id])
            })?;

        info!("event=computer_delete module=persistence status=ok id={id} changed={changed}");
        Ok(())
    }

    fn delete_all(&self, ids: &[ComputerId]) -> PersistenceResult<()> {
        for id in ids {
            self.delete(Some(*id))?;
        }
        Ok(())
    }
}
