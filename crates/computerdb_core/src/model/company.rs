//! Company entity.

use serde::{Deserialize, Serialize};

/// Store-generated company identity.
pub type CompanyId = i64;

/// Computer manufacturer. Read-only from the persistence layer's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

impl Company {
    pub fn new(id: CompanyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
