//! Computer entity.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on creation.
//! - `discontinued` must not precede `introduced` when both are set. The
//!   persistence layer does not check this; front ends call
//!   [`Computer::validate`] before saving.

use super::company::{Company, CompanyId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-generated computer identity.
pub type ComputerId = i64;

/// One inventoried computer model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Computer {
    pub id: Option<ComputerId>,
    pub name: String,
    pub introduced: Option<NaiveDate>,
    pub discontinued: Option<NaiveDate>,
    /// Only the company id is persisted; the name is filled on reads.
    pub company: Option<Company>,
}

/// Rejected computer field combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputerValidationError {
    EmptyName,
    DiscontinuedBeforeIntroduced {
        introduced: NaiveDate,
        discontinued: NaiveDate,
    },
}

impl Display for ComputerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => f.write_str("computer name cannot be empty"),
            Self::DiscontinuedBeforeIntroduced {
                introduced,
                discontinued,
            } => write!(
                f,
                "discontinued ({discontinued}) must not precede introduced ({introduced})"
            ),
        }
    }
}

impl Error for ComputerValidationError {}

impl Computer {
    /// Creates a transient computer with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            introduced: None,
            discontinued: None,
            company: None,
        }
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        self.company.as_ref().map(|company| company.id)
    }

    /// Checks the name and the introduced/discontinued ordering.
    pub fn validate(&self) -> Result<(), ComputerValidationError> {
        if self.name.trim().is_empty() {
            return Err(ComputerValidationError::EmptyName);
        }
        if let (Some(introduced), Some(discontinued)) = (self.introduced, self.discontinued) {
            if discontinued < introduced {
                return Err(ComputerValidationError::DiscontinuedBeforeIntroduced {
                    introduced,
                    discontinued,
                });
            }
        }
        Ok(())
    }
}

impl Display for Computer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self
            .id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let date = |value: Option<NaiveDate>| {
            value.map_or_else(|| "-".to_string(), |date| date.to_string())
        };
        write!(
            f,
            "Computer [id={}, name={}, introduced={}, discontinued={}, company={}]",
            id,
            self.name,
            date(self.introduced),
            date(self.discontinued),
            self.company
                .as_ref()
                .map_or("-", |company| company.name.as_str())
        )
    }
}
