//! Derived read projections over the roster.
//!
//! # Responsibility
//! - Expose the filtered/sorted student list consumed by presentation.
//! - Provide predicate builders for find-style commands.
//!
//! # Invariants
//! - Views are pull-based: recomputed from the store, never patched.

pub mod filtered_view;
pub mod predicates;
