//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Migrations only move forward; existing rows are never dropped.

use crate::contract::PetSchema;
use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: fn(&PetSchema) -> String,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: PetSchema::create_table_sql,
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
///
/// Safe to call repeatedly. On a fully migrated database only the table of
/// `schema` is created when missing; existing rows are left untouched.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is newer than this binary.
pub fn apply_migrations(conn: &Connection, schema: &PetSchema) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return ensure_schema_table(conn, schema);
    }

    // Immediate lock so concurrent first opens do not both migrate; the
    // version is re-read once the lock is held.
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let locked_version = current_user_version(&tx)?;
    for migration in MIGRATIONS {
        if migration.version <= locked_version {
            continue;
        }

        tx.execute_batch(&(migration.sql)(schema))?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    ensure_schema_table(&tx, schema)?;
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} table={}",
        locked_version,
        latest,
        schema.table_name()
    );

    Ok(())
}

// `user_version` is tracked per file while the table name comes from the
// schema, so a file migrated for one table may still lack another.
fn ensure_schema_table(conn: &Connection, schema: &PetSchema) -> DbResult<()> {
    conn.execute_batch(&schema.create_table_sql())?;
    Ok(())
}

/// Reads `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
