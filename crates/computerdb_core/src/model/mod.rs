//! Domain entities for the computer inventory.
//!
//! # Invariants
//! - Entities are transient values; persistence happens only through DAOs.
//! - Identities are store-generated integers.

pub mod company;
pub mod computer;
