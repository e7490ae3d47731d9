//! In-memory roster store.
//!
//! # Responsibility
//! - Own the canonical, insertion-ordered collection of student records.
//! - Enforce identity uniqueness and enrollment rules on every mutation.
//!
//! # Invariants
//! - Mutations are all-or-nothing; a rejected call leaves the store untouched.
//! - Callers outside core never mutate records except through `RecordStore`.

pub mod record_store;
