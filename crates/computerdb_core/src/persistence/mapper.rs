//! Row-to-entity mapping.
//!
//! # Responsibility
//! - Turn an open cursor into one entity, or all remaining entities.
//! - Read columns strictly by name so reordering a `SELECT` list is harmless.
//!
//! # Invariants
//! - `map_row` advances the cursor at most once; an exhausted cursor yields `None`.
//! - `map_rows` preserves cursor order; an empty cursor yields an empty `Vec`.
//! - A null joined `company.id` means "no company", not an error.
//! - Date columns keep only their leading `YYYY-MM-DD`, so timestamps map too.

use crate::model::company::{Company, CompanyId};
use crate::model::computer::{Computer, ComputerId};
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use rusqlite::{Row, Rows};

/// Column prefix used for company columns in joined selects.
pub const COMPANY_PREFIX: &str = "company.";

const DATE_PREFIX_LEN: usize = "YYYY-MM-DD".len();

/// Date column that may also hold a `YYYY-MM-DD HH:MM:SS` timestamp.
struct StoredDate(NaiveDate);

impl FromSql for StoredDate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?.trim();
        let date_part = text.get(..DATE_PREFIX_LEN).unwrap_or(text);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map(StoredDate)
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

fn read_date(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<NaiveDate>> {
    Ok(row
        .get::<_, Option<StoredDate>>(column)?
        .map(|stored| stored.0))
}

/// Maps store rows to one entity type.
pub trait RowMapper<T> {
    /// Maps the row the cursor currently points at.
    fn map_current(&self, row: &Row<'_>) -> rusqlite::Result<T>;

    /// Advances the cursor once and maps that row, if any.
    fn map_row(&self, rows: &mut Rows<'_>) -> rusqlite::Result<Option<T>> {
        match rows.next()? {
            Some(row) => self.map_current(row).map(Some),
            None => Ok(None),
        }
    }

    /// Consumes the cursor and maps every remaining row.
    fn map_rows(&self, rows: &mut Rows<'_>) -> rusqlite::Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(self.map_current(row)?);
        }
        Ok(items)
    }
}

/// Maps `company` rows, optionally under a column prefix.
#[derive(Debug, Clone)]
pub struct CompanyRowMapper {
    id_column: String,
    name_column: String,
}

impl CompanyRowMapper {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            id_column: format!("{prefix}id"),
            name_column: format!("{prefix}name"),
        }
    }

    /// Reads `id` and `name` from a plain company select.
    pub fn standalone() -> Self {
        Self::with_prefix("")
    }

    /// Reads `company.id` and `company.name` from a joined select.
    pub fn joined() -> Self {
        Self::with_prefix(COMPANY_PREFIX)
    }

    /// Maps the company side of an outer join; a null id means no company.
    pub fn map_optional(&self, row: &Row<'_>) -> rusqlite::Result<Option<Company>> {
        let Some(id) = row.get::<_, Option<CompanyId>>(self.id_column.as_str())? else {
            return Ok(None);
        };
        Ok(Some(Company {
            id,
            name: row.get(self.name_column.as_str())?,
        }))
    }
}

impl RowMapper<Company> for CompanyRowMapper {
    fn map_current(&self, row: &Row<'_>) -> rusqlite::Result<Company> {
        Ok(Company {
            id: row.get(self.id_column.as_str())?,
            name: row.get(self.name_column.as_str())?,
        })
    }
}

/// Maps `computer` rows left-joined with `company`.
#[derive(Debug, Clone)]
pub struct ComputerRowMapper {
    company: CompanyRowMapper,
}

impl ComputerRowMapper {
    pub fn new() -> Self {
        Self {
            company: CompanyRowMapper::joined(),
        }
    }
}

impl Default for ComputerRowMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl RowMapper<Computer> for ComputerRowMapper {
    fn map_current(&self, row: &Row<'_>) -> rusqlite::Result<Computer> {
        Ok(Computer {
            id: Some(row.get::<_, ComputerId>("id")?),
            name: row.get("name")?,
            introduced: read_date(row, "introduced")?,
            discontinued: read_date(row, "discontinued")?,
            company: self.company.map_optional(row)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CompanyRowMapper, ComputerRowMapper, RowMapper};
    use crate::model::company::Company;
    use chrono::NaiveDate;
    use rusqlite::Connection;

    const JOINED_ROWS: &str = "SELECT * FROM (
        SELECT 1 AS id, 'Apple I' AS name, '1976-04-01' AS introduced,
               NULL AS discontinued, 1 AS \"company.id\", 'Apple Inc.' AS \"company.name\"
        UNION ALL
        SELECT 2, 'CM-2', NULL, NULL, NULL, NULL
    ) ORDER BY id";

    #[test]
    fn map_row_on_empty_cursor_returns_none() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 1 AS id, 'x' AS name WHERE 0")
            .unwrap();
        let mut rows = stmt.query([]).unwrap();

        let mapped = CompanyRowMapper::standalone().map_row(&mut rows).unwrap();
        assert!(mapped.is_none());
    }

    #[test]
    fn map_rows_on_empty_cursor_returns_empty_vec() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 1 AS id, 'x' AS name WHERE 0")
            .unwrap();
        let mut rows = stmt.query([]).unwrap();

        let mapped = CompanyRowMapper::standalone().map_rows(&mut rows).unwrap();
        assert!(mapped.is_empty());
    }

    #[test]
    fn map_row_consumes_exactly_one_row() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare(JOINED_ROWS).unwrap();
        let mut rows = stmt.query([]).unwrap();
        let mapper = ComputerRowMapper::new();

        let first = mapper.map_row(&mut rows).unwrap().unwrap();
        assert_eq!(first.id, Some(1));
        let rest = mapper.map_rows(&mut rows).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, Some(2));
        assert!(mapper.map_row(&mut rows).unwrap().is_none());
    }

    #[test]
    fn computer_mapper_reads_dates_and_optional_company() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare(JOINED_ROWS).unwrap();
        let mut rows = stmt.query([]).unwrap();

        let computers = ComputerRowMapper::new().map_rows(&mut rows).unwrap();
        assert_eq!(computers.len(), 2);

        let apple = &computers[0];
        assert_eq!(apple.name, "Apple I");
        assert_eq!(apple.introduced, NaiveDate::from_ymd_opt(1976, 4, 1));
        assert_eq!(apple.discontinued, None);
        assert_eq!(apple.company, Some(Company::new(1, "Apple Inc.")));

        let cm2 = &computers[1];
        assert_eq!(cm2.introduced, None);
        assert_eq!(cm2.company, None);
    }

    #[test]
    fn computer_mapper_reads_timestamp_shaped_dates() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT 1 AS id, 'Amiga 500' AS name, '1987-04-01 00:00:00' AS introduced,
                        '1991-01-01T12:30:00' AS discontinued,
                        NULL AS \"company.id\", NULL AS \"company.name\"",
            )
            .unwrap();
        let mut rows = stmt.query([]).unwrap();

        let amiga = ComputerRowMapper::new().map_row(&mut rows).unwrap().unwrap();
        assert_eq!(amiga.introduced, NaiveDate::from_ymd_opt(1987, 4, 1));
        assert_eq!(amiga.discontinued, NaiveDate::from_ymd_opt(1991, 1, 1));
    }

    #[test]
    fn computer_mapper_rejects_non_date_text() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT 1 AS id, 'x' AS name, 'someday' AS introduced, NULL AS discontinued,
                        NULL AS \"company.id\", NULL AS \"company.name\"",
            )
            .unwrap();
        let mut rows = stmt.query([]).unwrap();

        assert!(ComputerRowMapper::new().map_row(&mut rows).is_err());
    }

    #[test]
    fn prefixed_mapper_ignores_unprefixed_columns() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 7 AS id, 'CM-5' AS name, 3 AS \"company.id\", 'Thinking Machines' AS \"company.name\"")
            .unwrap();
        let mut rows = stmt.query([]).unwrap();

        let company = CompanyRowMapper::joined()
            .map_row(&mut rows)
            .unwrap()
            .unwrap();
        assert_eq!(company, Company::new(3, "Thinking Machines"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT 1 AS id").unwrap();
        let mut rows = stmt.query([]).unwrap();

        assert!(CompanyRowMapper::standalone().map_row(&mut rows).is_err());
    }
}
