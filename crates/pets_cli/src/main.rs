//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `pets_core` wiring against a real database file.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `pets_cli [DB_PATH]`; without a path an in-memory database is used.
//! Logs go to `<temp>/pets-logs`.

use log::info;
use pets_core::db::{open_db, open_db_in_memory};
use pets_core::{
    init_logging_with, LogLevel, LoggingConfig, PetSchema, PetService, RepoError, SqlitePetStore,
};
use std::path::Path;
use std::process::ExitCode;

const LOG_DIR_NAME: &str = "pets-logs";

fn main() -> ExitCode {
    init_cli_logging(&std::env::temp_dir().join(LOG_DIR_NAME));
    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pets_cli failed: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Starts file logging. A logging failure is reported and the run goes on.
fn init_cli_logging(log_dir: &Path) -> bool {
    let config = LoggingConfig {
        level: LogLevel::default_for_build(),
        log_dir: log_dir.to_path_buf(),
    };
    match init_logging_with(config) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("pets_cli logging disabled: {err}");
            false
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), RepoError> {
    println!("pets_core version={}", pets_core::core_version());

    let schema = PetSchema::default();
    let conn = match db_path.as_deref() {
        Some(path) => open_db(path, &schema)?,
        None => open_db_in_memory(&schema)?,
    };
    let service = PetService::new(SqlitePetStore::try_new(&conn, schema)?);

    let id = service.insert_sample_pet()?;
    info!("event=cli_insert_sample module=cli status=ok id={id}");
    println!("inserted sample pet id={id}");
    println!("{}", service.catalog_summary()?);

    for pet in service.list_pets(None)? {
        println!(
            "{} - {} ({}, {}, {})",
            pet.id,
            pet.name,
            pet.breed_label(),
            pet.gender.label(),
            pet.weight
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{init_cli_logging, run};
    use pets_core::db::open_db;
    use pets_core::{logging_status, PetSchema, PetService, SqlitePetStore};

    #[test]
    fn run_logs_to_dir_and_appends_sample_to_file_db() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        assert!(init_cli_logging(&log_dir));
        assert_eq!(logging_status().unwrap().log_dir, log_dir);
        assert!(log_dir.is_dir());

        let db_path = dir.path().join("pets.db");
        let db_arg = db_path.to_str().unwrap().to_string();
        run(Some(db_arg.clone())).unwrap();
        run(Some(db_arg)).unwrap();

        let conn = open_db(&db_path, &PetSchema::default()).unwrap();
        let store = SqlitePetStore::try_new(&conn, PetSchema::default()).unwrap();
        let service = PetService::new(store);
        assert_eq!(
            service.catalog_summary().unwrap(),
            "Number of rows in pets database table: 2"
        );
    }
}
