//! Record store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the CRUD contract addressed by `Target`.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store writes validate input before persistence.
//! - Store APIs return semantic errors (`Validation`, `NotFound`) distinctly
//!   from storage errors.

pub mod pet_repo;
pub mod query;
