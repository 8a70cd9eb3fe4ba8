//! UI bridge for the pets record store.
//!
//! Functions in `api` are the only entry points the UI layer calls.

pub mod api;
