//! Computer inventory use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for front ends.
//! - Delegate persistence to DAO implementations.
//!
//! # Invariants
//! - Service APIs never bypass DAO contracts.
//! - Service layer remains storage-agnostic.

use crate::model::company::{Company, CompanyId};
use crate::model::computer::{Computer, ComputerId};
use crate::persistence::company_dao::CompanyDao;
use crate::persistence::computer_dao::ComputerDao;
use crate::persistence::PersistenceResult;

/// Use-case façade over the computer and company DAOs.
pub struct ComputerDatabaseService<C: ComputerDao, P: CompanyDao> {
    computers: C,
    companies: P,
}

impl<C: ComputerDao, P: CompanyDao> ComputerDatabaseService<C, P> {
    pub fn new(computers: C, companies: P) -> Self {
        Self {
            computers,
            companies,
        }
    }

    pub fn retrieve_all_computers(&self) -> PersistenceResult<Vec<Computer>> {
        self.computers.retrieve_all()
    }

    pub fn retrieve_one_computer(&self, id: ComputerId) -> PersistenceResult<Option<Computer>> {
        self.computers.retrieve_one(id)
    }

    pub fn retrieve_all_companies(&self) -> PersistenceResult<Vec<Company>> {
        self.companies.retrieve_all()
    }

    pub fn retrieve_one_company(&self, id: CompanyId) -> PersistenceResult<Option<Company>> {
        self.companies.retrieve_one(id)
    }

    /// Creates a transient computer or updates a persisted one.
    ///
    /// # Contract
    /// - `id == None` → create; the generated id is written into `computer`.
    /// - `id == Some(_)` → full update by id.
    pub fn save_computer(&self, computer: &mut Computer) -> PersistenceResult<ComputerId> {
        match computer.id {
            Some(id) => {
                self.computers.update(Some(&*computer))?;
                Ok(id)
            }
            None => self.computers.create(computer),
        }
    }

    pub fn delete_computer(&self, id: ComputerId) -> PersistenceResult<()> {
        self.computers.delete(Some(id))
    }

    /// Deletes in order; see [`ComputerDao::delete_all`] for partial failure.
    pub fn delete_computers(&self, ids: &[ComputerId]) -> PersistenceResult<()> {
        self.computers.delete_all(ids)
    }
}
