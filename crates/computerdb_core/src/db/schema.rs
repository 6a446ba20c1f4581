//! Idempotent creation of the `company` and `computer` tables.
//!
//! There is no versioning here: statements only create what is missing and
//! never alter existing tables.

use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the store tables if they do not exist yet.
pub(crate) fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::ensure_schema;
    use rusqlite::Connection;

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO company (name) VALUES ('Apple Inc.');", [])
            .unwrap();
        ensure_schema(&conn).unwrap();

        let companies: i64 = conn
            .query_row("SELECT COUNT(*) FROM company;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(companies, 1);
    }
}
