//! Read-only company DAO.

use crate::db::ConnectionProvider;
use crate::model::company::{Company, CompanyId};
use crate::persistence::mapper::{CompanyRowMapper, RowMapper};
use crate::persistence::PersistenceResult;
use std::sync::Arc;

const COMPANY_SELECT_SQL: &str = "SELECT id, name FROM company";

/// Data access contract for companies. No write operations are exposed.
pub trait CompanyDao {
    /// Lists every company ordered by id.
    fn retrieve_all(&self) -> PersistenceResult<Vec<Company>>;
    /// Loads one company; `Ok(None)` when no row matches.
    fn retrieve_one(&self, id: CompanyId) -> PersistenceResult<Option<Company>>;
}

/// SQLite-backed company DAO.
pub struct SqliteCompanyDao {
    provider: Arc<ConnectionProvider>,
    mapper: CompanyRowMapper,
}

impl SqliteCompanyDao {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self {
            provider,
            mapper: CompanyRowMapper::standalone(),
        }
    }
}

impl CompanyDao for SqliteCompanyDao {
    fn retrieve_all(&self) -> PersistenceResult<Vec<Company>> {
        let sql = format!("{COMPANY_SELECT_SQL} ORDER BY id ASC;");
        self.provider
            .with_statement("company_retrieve_all", &sql, |stmt| {
                let mut rows = stmt.query([])?;
                self.mapper.map_rows(&mut rows)
            })
    }

    fn retrieve_one(&self, id: CompanyId) -> PersistenceResult<Option<Company>> {
        let sql = format!("{COMPANY_SELECT_SQL} WHERE id = ?1;");
        self.provider
            .with_statement("company_retrieve_one", &sql, |stmt| {
                let mut rows = stmt.query([id])?;
                self.mapper.map_row(&mut rows)
            })
    }
}
