//! Core record store for the pets catalog.
//! This crate is the single source of truth for pet record invariants.

pub mod contract;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use contract::{PetColumn, PetSchema, ResourceShape};
pub use logging::{
    init_logging, init_logging_with, logging_status, LogLevel, LoggingConfig, LoggingError,
};
pub use model::pet::{
    is_valid_gender, Gender, NewPet, PetChanges, PetId, PetRecord, PetValidationError,
};
pub use repo::pet_repo::{PetStore, RepoError, RepoResult, SqlitePetStore};
pub use repo::query::{PetFilter, PetSort, SortDirection, Target};
pub use service::pet_service::PetService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
