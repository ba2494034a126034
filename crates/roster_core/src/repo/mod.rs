//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract used by the student service.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes only accept validated input.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `DuplicateRollNumber`) in addition to DB transport errors.

pub mod memory_repo;
pub mod student_repo;
