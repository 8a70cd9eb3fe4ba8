//! Pet record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide typed CRUD over the single pet table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate every supplied field before any SQL runs; a
//!   rejected call never touches storage.
//! - An empty partial update is a no-op returning zero rows.
//! - Deleting zero rows is success.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Reads are fully materialized; no statement outlives the call.

use crate::contract::{PetColumn, PetSchema};
use crate::db::migrations::{apply_migrations, current_user_version, latest_version};
use crate::db::DbError;
use crate::model::pet::{Gender, NewPet, PetChanges, PetId, PetRecord, PetValidationError};
use crate::repo::query::{PetSort, Target};
use log::{debug, error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy for record store calls.
///
/// `Validation` is caller input, `NotFound` is a missing item, everything
/// else is a storage-side failure.
#[derive(Debug)]
pub enum RepoError {
    /// Bad or missing field; detected before any mutation.
    Validation(PetValidationError),
    /// Item lookup matched no row.
    NotFound(PetId),
    /// Underlying SQLite/bootstrap failure.
    Db(DbError),
    /// Persisted row cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(String),
    /// Required column is missing from the pet table.
    MissingRequiredColumn {
        table: String,
        column: &'static str,
    },
}

impl RepoError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for every system-side failure.
    pub fn is_storage(&self) -> bool {
        !self.is_validation() && !self.is_not_found()
    }

    /// Stable short code for envelopes and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            _ => "storage",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "pet not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "pet store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "pet store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "pet store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PetValidationError> for RepoError {
    fn from(value: PetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record store interface consumed by services and the UI boundary.
pub trait PetStore {
    /// Ensures the table exists. Idempotent.
    fn initialize(&self) -> RepoResult<()>;

    /// Returns every row matching `target`, optionally ordered.
    fn query(&self, target: &Target, sort: Option<&PetSort>) -> RepoResult<Vec<PetRecord>>;

    /// Returns every row, optionally ordered.
    fn query_all(&self, sort: Option<&PetSort>) -> RepoResult<Vec<PetRecord>> {
        self.query(&Target::AllRows, sort)
    }

    /// Returns one row or `RepoError::NotFound`.
    fn query_by_id(&self, id: PetId) -> RepoResult<PetRecord>;

    /// Counts rows matching `target`.
    fn count(&self, target: &Target) -> RepoResult<u64>;

    /// Validates and persists a candidate, returning its new id.
    fn insert(&self, candidate: &NewPet) -> RepoResult<PetId>;

    /// Applies every present field to every matching row.
    fn update(&self, target: &Target, changes: &PetChanges) -> RepoResult<usize>;

    /// Removes every matching row.
    fn delete(&self, target: &Target) -> RepoResult<usize>;
}

/// SQLite-backed pet store.
///
/// Relies on SQLite transaction isolation: every call is a single statement
/// (or one migration transaction), so concurrent connections to the same
/// file serialize in the engine.
pub struct SqlitePetStore<'conn> {
    conn: &'conn Connection,
    schema: PetSchema,
}

impl<'conn> SqlitePetStore<'conn> {
    /// Wraps a connection without checking its schema.
    ///
    /// Call `initialize()` before any other operation.
    pub fn new(conn: &'conn Connection, schema: PetSchema) -> Self {
        Self { conn, schema }
    }

    /// Wraps a connection that has already been migrated for `schema`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection, schema: PetSchema) -> RepoResult<Self> {
        ensure_connection_ready(conn, &schema)?;
        Ok(Self { conn, schema })
    }

    pub fn schema(&self) -> &PetSchema {
        &self.schema
    }

    fn table(&self) -> &str {
        self.schema.table_name()
    }
}

impl PetStore for SqlitePetStore<'_> {
    fn initialize(&self) -> RepoResult<()> {
        apply_migrations(self.conn, &self.schema)?;
        ensure_connection_ready(self.conn, &self.schema)
    }

    fn query(&self, target: &Target, sort: Option<&PetSort>) -> RepoResult<Vec<PetRecord>> {
        let (where_clause, bind_values) = target.to_filter().to_where_clause();
        let order_clause = sort.map(PetSort::to_order_clause).unwrap_or_default();
        let sql = format!(
            "SELECT {} FROM {}{where_clause}{order_clause};",
            self.schema.select_columns(),
            self.table()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut pets = Vec::new();

        while let Some(row) = rows.next()? {
            pets.push(parse_pet_row(row)?);
        }

        debug!(
            "event=pet_query module=repo status=ok shape={:?} rows={}",
            target.shape(),
            pets.len()
        );
        Ok(pets)
    }

    fn query_by_id(&self, id: PetId) -> RepoResult<PetRecord> {
        self.query(&Target::ById(id), None)?
            .into_iter()
            .next()
            .ok_or(RepoError::NotFound(id))
    }

    fn count(&self, target: &Target) -> RepoResult<u64> {
        let (where_clause, bind_values) = target.to_filter().to_where_clause();
        let sql = format!("SELECT COUNT(*) FROM {}{where_clause};", self.table());
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }

    fn insert(&self, candidate: &NewPet) -> RepoResult<PetId> {
        let valid = candidate
            .validate()
            .inspect_err(|err| log_rejection("pet_insert", err))?;

        let sql = format!(
            "INSERT INTO {} ({}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4);",
            self.table(),
            PetColumn::Name.name(),
            PetColumn::Breed.name(),
            PetColumn::Gender.name(),
            PetColumn::Weight.name(),
        );

        let result = self.conn.execute(
            &sql,
            params![valid.name, valid.breed, valid.gender.code(), valid.weight],
        );
        if let Err(err) = result {
            error!(
                "event=pet_insert module=repo status=error error_code=insert_failed error={}",
                err
            );
            return Err(err.into());
        }

        let id = self.conn.last_insert_rowid();
        info!("event=pet_insert module=repo status=ok id={id}");
        Ok(id)
    }

    fn update(&self, target: &Target, changes: &PetChanges) -> RepoResult<usize> {
        changes
            .validate()
            .inspect_err(|err| log_rejection("pet_update", err))?;

        if changes.is_empty() {
            debug!("event=pet_update module=repo status=noop rows=0");
            return Ok(0);
        }

        let (assignments, mut bind_values) = set_clause(changes);
        let (where_clause, where_values) = target.to_filter().to_where_clause();
        bind_values.extend(where_values);

        let sql = format!("UPDATE {} SET {assignments}{where_clause};", self.table());
        let changed = match self.conn.execute(&sql, params_from_iter(bind_values)) {
            Ok(changed) => changed,
            Err(err) => {
                error!(
                    "event=pet_update module=repo status=error error_code=update_failed error={}",
                    err
                );
                return Err(err.into());
            }
        };

        info!(
            "event=pet_update module=repo status=ok shape={:?} rows={changed}",
            target.shape()
        );
        Ok(changed)
    }

    fn delete(&self, target: &Target) -> RepoResult<usize> {
        let (where_clause, bind_values) = target.to_filter().to_where_clause();
        let sql = format!("DELETE FROM {}{where_clause};", self.table());

        let changed = match self.conn.execute(&sql, params_from_iter(bind_values)) {
            Ok(changed) => changed,
            Err(err) => {
                error!(
                    "event=pet_delete module=repo status=error error_code=delete_failed error={}",
                    err
                );
                return Err(err.into());
            }
        };

        info!(
            "event=pet_delete module=repo status=ok shape={:?} rows={changed}",
            target.shape()
        );
        Ok(changed)
    }
}

fn set_clause(changes: &PetChanges) -> (String, Vec<Value>) {
    let mut assignments: Vec<String> = Vec::new();
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(name) = &changes.name {
        assignments.push(format!("{} = ?", PetColumn::Name.name()));
        bind_values.push(Value::Text(name.clone()));
    }

    if let Some(breed) = &changes.breed {
        assignments.push(format!("{} = ?", PetColumn::Breed.name()));
        bind_values.push(breed.clone().map_or(Value::Null, Value::Text));
    }

    if let Some(gender) = changes.gender {
        assignments.push(format!("{} = ?", PetColumn::Gender.name()));
        bind_values.push(Value::Integer(gender));
    }

    if let Some(weight) = changes.weight {
        assignments.push(format!("{} = ?", PetColumn::Weight.name()));
        bind_values.push(Value::Integer(weight));
    }

    (assignments.join(", "), bind_values)
}

fn log_rejection(event: &str, err: &PetValidationError) {
    // Caller input problem, not a system fault.
    debug!("event={event} module=repo status=rejected reason={err}");
}

fn parse_pet_row(row: &Row<'_>) -> RepoResult<PetRecord> {
    let gender_code: i64 = row.get(PetColumn::Gender.name())?;
    let gender = Gender::from_code(gender_code).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid gender code `{gender_code}` in gender column"))
    })?;

    let pet = PetRecord {
        id: row.get(PetColumn::Id.name())?,
        name: row.get(PetColumn::Name.name())?,
        breed: row.get(PetColumn::Breed.name())?,
        gender,
        weight: row.get(PetColumn::Weight.name())?,
    };
    pet.validate()
        .map_err(|err| RepoError::InvalidData(format!("row {}: {err}", pet.id)))?;
    Ok(pet)
}

fn ensure_connection_ready(conn: &Connection, schema: &PetSchema) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table = schema.table_name();
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table.to_string()));
    }

    for column in PetColumn::ALL {
        if !table_has_column(conn, table, column.name())? {
            return Err(RepoError::MissingRequiredColumn {
                table: table.to_string(),
                column: column.name(),
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
