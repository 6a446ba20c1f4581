use computerdb_core::db::open_store;
use computerdb_core::{
    Computer, ComputerDao, ConnectionError, ConnectionProvider, SqliteComputerDao, StoreConfig,
};
use rusqlite::Connection;
use std::sync::Arc;

#[test]
fn open_in_memory_creates_both_tables() {
    let provider = ConnectionProvider::in_memory().unwrap();
    let lease = provider.get_connection().unwrap();
    let conn = lease.connection().unwrap();

    assert_table_exists(conn, "company");
    assert_table_exists(conn, "computer");
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn file_store_persists_across_providers() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::file(dir.path().join("computers.db"));

    let id = {
        let provider = Arc::new(ConnectionProvider::open(config.clone()).unwrap());
        let dao = SqliteComputerDao::new(Arc::clone(&provider));
        let mut computer = Computer::new("Cray-1");
        let id = dao.create(&mut computer).unwrap();
        provider.close().unwrap();
        id
    };

    let provider = Arc::new(ConnectionProvider::open(config).unwrap());
    let dao = SqliteComputerDao::new(provider);
    let loaded = dao.retrieve_one(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Cray-1");
}

#[test]
fn opening_unreachable_path_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::file(dir.path().join("missing").join("nested").join("db.sqlite"));

    match ConnectionProvider::open(config) {
        Err(ConnectionError::Open { target, .. }) => assert!(target.ends_with("db.sqlite")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected open failure"),
    }
}

#[test]
fn opening_store_with_incompatible_table_is_a_bootstrap_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conflict.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE computer (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")
            .unwrap();
    }

    let err = open_store(&StoreConfig::file(&path)).unwrap_err();
    assert!(matches!(err, ConnectionError::Bootstrap(_)));
}

#[test]
fn lease_release_is_idempotent() {
    let provider = ConnectionProvider::in_memory().unwrap();
    let mut lease = provider.get_connection().unwrap();

    assert!(lease.release().is_none());
    assert!(lease.release().is_none());
    drop(lease);

    assert!(provider.get_connection().is_ok());
    assert_eq!(provider.leases_granted(), 2);
}

#[test]
fn each_dao_call_takes_exactly_one_lease() {
    let provider = Arc::new(ConnectionProvider::in_memory().unwrap());
    let dao = SqliteComputerDao::new(Arc::clone(&provider));

    let mut computer = Computer::new("PDP-11");
    dao.create(&mut computer).unwrap();
    dao.retrieve_all().unwrap();
    dao.retrieve_one(computer.id.unwrap()).unwrap();
    dao.delete(computer.id).unwrap();

    assert_eq!(provider.leases_granted(), 4);
}

#[test]
fn concurrent_callers_are_serialized_on_the_shared_connection() {
    let provider = Arc::new(ConnectionProvider::in_memory().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let dao = SqliteComputerDao::new(Arc::clone(&provider));
            std::thread::spawn(move || {
                for n in 0..10 {
                    let mut computer = Computer::new(format!("worker-{worker}-{n}"));
                    dao.create(&mut computer).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let dao = SqliteComputerDao::new(provider);
    assert_eq!(dao.retrieve_all().unwrap().len(), 40);
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
