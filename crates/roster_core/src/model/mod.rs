//! Student roster domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by validation, queries and
//!   services.
//!
//! # Invariants
//! - Every persisted student is identified by a stable `StudentId`.
//! - Deletion is permanent; there is no tombstone state.

pub mod student;
