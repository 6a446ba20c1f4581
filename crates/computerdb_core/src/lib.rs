//! Persistence core for the computer inventory.
//! Owns the data-access contracts, row mapping and connection lifecycle.

pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod service;

pub use db::{ConnectionError, ConnectionLease, ConnectionProvider, StoreConfig, StoreLocation};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::company::{Company, CompanyId};
pub use model::computer::{Computer, ComputerId, ComputerValidationError};
pub use persistence::company_dao::{CompanyDao, SqliteCompanyDao};
pub use persistence::computer_dao::{ComputerDao, SqliteComputerDao};
pub use persistence::mapper::{CompanyRowMapper, ComputerRowMapper, RowMapper};
pub use persistence::{PersistenceError, PersistenceResult};
pub use service::computer_service::ComputerDatabaseService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
