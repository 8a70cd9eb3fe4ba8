//! Pet database bootstrap.
//!
//! `open_db`/`open_db_in_memory` hand out connections whose schema version
//! is current and whose pet table exists for the requested `PetSchema`.
//! Everything here is a storage concern; caller input errors live in the
//! model and repo layers.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, BUSY_TIMEOUT};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, migrating or talking to the pets database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected a statement or the file could not be opened.
    Sqlite(rusqlite::Error),
    /// The file was written by a build with a newer pet schema.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// True when SQLite gave up waiting for another writer.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(code, _))
                if matches!(
                    code.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "pets database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "pets database schema v{db_version} is newer than this build (max v{latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Sqlite(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn messages_name_the_pets_database() {
        let too_new = DbError::UnsupportedSchemaVersion {
            db_version: 4,
            latest_supported: 1,
        };
        assert_eq!(
            too_new.to_string(),
            "pets database schema v4 is newer than this build (max v1)"
        );
        assert!(too_new.source().is_none());

        let sqlite = DbError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(sqlite.to_string().starts_with("pets database error: "));
        assert!(sqlite.source().is_some());
        assert!(!sqlite.is_busy());
    }

    #[test]
    fn busy_failures_are_detected() {
        let busy = DbError::from(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ));
        assert!(busy.is_busy());
    }
}
