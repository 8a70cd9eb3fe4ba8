//! Pet domain model.
//!
//! # Responsibility
//! - Define the record shape and write-path candidates used by the store.
//!
//! # Invariants
//! - Every record is identified by a storage-assigned `PetId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod pet;
