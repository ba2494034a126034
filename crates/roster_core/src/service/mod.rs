//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, queries and repository calls into the roster's
//!   List/Add/Edit/Delete operations.
//! - Keep presentation layers decoupled from storage details.

pub mod student_service;
