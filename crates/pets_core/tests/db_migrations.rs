use pets_core::db::migrations::{apply_migrations, latest_version};
use pets_core::db::{open_db, open_db_in_memory, DbError};
use pets_core::{Gender, NewPet, PetSchema, PetStore, RepoError, SqlitePetStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory(&PetSchema::default()).unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "pets");
}

#[test]
fn reopening_file_database_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pets.db");

    let conn_first = open_db(&path, &PetSchema::default()).unwrap();
    let id = SqlitePetStore::try_new(&conn_first, PetSchema::default())
        .unwrap()
        .insert(&NewPet::new("Toto", Gender::Male))
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path, &PetSchema::default()).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let store = SqlitePetStore::try_new(&conn_second, PetSchema::default()).unwrap();
    assert_eq!(store.query_by_id(id).unwrap().name, "Toto");
}

#[test]
fn applying_migrations_twice_is_idempotent() {
    let conn = open_db_in_memory(&PetSchema::default()).unwrap();
    conn.execute(
        "INSERT INTO pets (name, gender, weight) VALUES ('Toto', 1, 7);",
        [],
    )
    .unwrap();

    apply_migrations(&conn, &PetSchema::default()).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM pets;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path, &PetSchema::default()).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn initialize_on_newer_database_reports_storage_error() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();

    let err = SqlitePetStore::new(&conn, PetSchema::default())
        .initialize()
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Db(DbError::UnsupportedSchemaVersion { db_version: 999, .. })
    ));
    assert!(err.is_storage());
}

#[test]
fn second_schema_on_migrated_database_gets_its_own_table() {
    let conn = open_db_in_memory(&PetSchema::default()).unwrap();
    let shelter = PetSchema::new("shelter").unwrap();

    let store = SqlitePetStore::new(&conn, shelter);
    store.initialize().unwrap();

    assert_table_exists(&conn, "pets");
    assert_table_exists(&conn, "shelter");
}

#[test]
fn reopening_migrated_file_with_custom_schema_creates_its_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pets.db");

    let conn_first = open_db(&path, &PetSchema::default()).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let shelter = PetSchema::new("shelter").unwrap();
    let conn_second = open_db(&path, &shelter).unwrap();
    assert_table_exists(&conn_second, "pets");
    assert_table_exists(&conn_second, "shelter");

    let store = SqlitePetStore::try_new(&conn_second, shelter).unwrap();
    let id = store.insert(&NewPet::new("Nala", Gender::Female)).unwrap();
    assert_eq!(store.query_by_id(id).unwrap().name, "Nala");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
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
