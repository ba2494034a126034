//! Core domain logic for the student roster.
//! This crate is the single source of truth for roster invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod validation;

pub use config::RosterConfig;
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::student::{
    class_choices, ClassChoice, Student, StudentClass, StudentField, StudentId, StudentInput,
};
pub use query::{build_view, ListParams, Page, SortKey, StudentFilter, StudentQuery, PAGE_SIZE};
pub use repo::memory_repo::MemoryStudentRepository;
pub use repo::student_repo::{RepoError, RepoResult, SqliteStudentRepository, StudentRepository};
pub use service::student_service::{
    DeleteOutcome, DeleteRequest, FormOutcome, ServiceError, ServiceResult, StudentForm,
    StudentListView, StudentService,
};
pub use validation::{validate_student, FieldError, FieldErrorKind, ValidatedStudent, ValidationErrors};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
