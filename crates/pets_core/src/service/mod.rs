//! Use-case service layer.
//!
//! # Responsibility
//! - Expose catalog/editor flows on top of the record store contract.

pub mod pet_service;
