//! Roster domain model.
//!
//! # Responsibility
//! - Define the student record and its validated field types.
//! - Define user preferences persisted alongside the roster.
//!
//! # Invariants
//! - Every student is identified by a unique `Identity` within one store.
//! - Field values are validated once, at construction.

pub mod prefs;
pub mod record;
