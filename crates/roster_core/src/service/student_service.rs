//! Student use-case service.
//!
//! # Responsibility
//! - Provide the List/Add/Edit/Delete operations of the roster page.
//! - Run validation before every write and shape results for presentation.
//!
//! # Invariants
//! - Invalid submissions never reach the repository.
//! - Deletion happens only for an explicit `DeleteRequest::Confirm`.
//! - Service layer remains storage-agnostic.

use crate::model::student::{class_choices, ClassChoice, Student, StudentId, StudentInput};
use crate::query::{ListParams, Page, Paginator, PAGE_SIZE, ALLOWED_SORT_KEYS};
use crate::repo::student_repo::{RepoError, StudentRepository};
use crate::validation::{normalize_roll_number, validate_student, ValidationErrors};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ADD_TITLE: &str = "Add New Student";
pub const EDIT_TITLE: &str = "Edit Student";
pub const ADDED_NOTICE: &str = "Student added successfully!";
pub const UPDATED_NOTICE: &str = "Student updated successfully!";
pub const DELETED_NOTICE: &str = "Student deleted successfully!";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for student use-cases.
///
/// Validation failures are not errors here; they come back as
/// `FormOutcome::Invalid`.
#[derive(Debug)]
pub enum ServiceError {
    /// Edit/delete target does not exist.
    NotFound(StudentId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Everything the list page needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentListView {
    pub page: Page<Student>,
    pub class_choices: Vec<ClassChoice>,
    pub sort_keys: [&'static str; 8],
}

/// Add/edit form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentForm {
    pub title: &'static str,
    /// Values to pre-fill, exactly as last entered.
    pub values: StudentInput,
    pub errors: ValidationErrors,
    /// Record being edited; `None` for add.
    pub student: Option<Student>,
    pub class_choices: Vec<ClassChoice>,
}

impl StudentForm {
    fn new(title: &'static str, values: StudentInput, student: Option<Student>) -> Self {
        Self {
            title,
            values,
            errors: ValidationErrors::new(),
            student,
            class_choices: class_choices(),
        }
    }

    fn with_errors(mut self, errors: ValidationErrors) -> Self {
        self.errors = errors;
        self
    }
}

/// Result of an add/edit submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormOutcome {
    Saved {
        student: Student,
        notice: &'static str,
    },
    Invalid(StudentForm),
}

/// Intent of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRequest {
    /// Show the confirmation prompt; never mutates.
    Prompt,
    /// Perform the deletion.
    Confirm,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteOutcome {
    ConfirmationRequired { student: Student },
    Deleted {
        student: Student,
        notice: &'static str,
    },
}

/// Use-case service wrapper for the student roster.
pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Lists one page of students for the given request parameters.
    ///
    /// Malformed parameters degrade to defaults; only storage failures error.
    pub fn list(&self, params: &ListParams) -> ServiceResult<StudentListView> {
        let query = params.to_query();
        let total = self.repo.count_students(&query)?;
        let paginator = Paginator::new(total, PAGE_SIZE);
        let number = paginator.clamp(params.page);
        let items =
            self.repo
                .list_students(&query, paginator.per_page(), paginator.offset(number))?;

        info!(
            "event=student_list module=service status=ok page={} total_pages={} total_count={} sort={}",
            number,
            paginator.total_pages(),
            total,
            query.sort().as_str()
        );

        Ok(StudentListView {
            page: Page::new(items, number, &paginator, params),
            class_choices: class_choices(),
            sort_keys: ALLOWED_SORT_KEYS,
        })
    }

    /// Empty add form with the default class preselected.
    pub fn add_form(&self) -> StudentForm {
        StudentForm::new(ADD_TITLE, StudentInput::default(), None)
    }

    /// Validates and persists a new student.
    pub fn add(&self, input: &StudentInput) -> ServiceResult<FormOutcome> {
        let form = || StudentForm::new(ADD_TITLE, input.clone(), None);

        let validated = match validate_student(input, None, self.roll_owner(input)?) {
            Ok(validated) => validated,
            Err(errors) => return Ok(reject("student_add", form().with_errors(errors))),
        };

        match self.repo.create_student(&validated) {
            Ok(student) => {
                info!(
                    "event=student_add module=service status=ok student_id={}",
                    student.id
                );
                Ok(FormOutcome::Saved {
                    student,
                    notice: ADDED_NOTICE,
                })
            }
            Err(RepoError::DuplicateRollNumber(_)) => Ok(reject(
                "student_add",
                form().with_errors(ValidationErrors::duplicate_roll_number()),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Edit form pre-filled from the stored record.
    pub fn edit_form(&self, id: StudentId) -> ServiceResult<StudentForm> {
        let student = self.require(id)?;
        Ok(StudentForm::new(
            EDIT_TITLE,
            StudentInput::from(&student),
            Some(student),
        ))
    }

    /// Validates and persists changes to an existing student.
    ///
    /// The student's own roll number does not count as a duplicate.
    pub fn edit(&self, id: StudentId, input: &StudentInput) -> ServiceResult<FormOutcome> {
        let current = self.require(id)?;
        let form = || StudentForm::new(EDIT_TITLE, input.clone(), Some(current.clone()));

        let validated = match validate_student(input, Some(id), self.roll_owner(input)?) {
            Ok(validated) => validated,
            Err(errors) => return Ok(reject("student_edit", form().with_errors(errors))),
        };

        match self.repo.update_student(id, &validated) {
            Ok(student) => {
                info!(
                    "event=student_edit module=service status=ok student_id={}",
                    student.id
                );
                Ok(FormOutcome::Saved {
                    student,
                    notice: UPDATED_NOTICE,
                })
            }
            Err(RepoError::DuplicateRollNumber(_)) => Ok(reject(
                "student_edit",
                form().with_errors(ValidationErrors::duplicate_roll_number()),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Shows the delete prompt or performs a confirmed deletion.
    pub fn delete(&self, id: StudentId, request: DeleteRequest) -> ServiceResult<DeleteOutcome> {
        let student = self.require(id)?;

        match request {
            DeleteRequest::Prompt => Ok(DeleteOutcome::ConfirmationRequired { student }),
            DeleteRequest::Confirm => {
                self.repo.delete_student(id)?;
                info!("event=student_delete module=service status=ok student_id={id}");
                Ok(DeleteOutcome::Deleted {
                    student,
                    notice: DELETED_NOTICE,
                })
            }
        }
    }

    /// Loads one student or fails with `NotFound`.
    pub fn get(&self, id: StudentId) -> ServiceResult<Student> {
        self.require(id)
    }

    fn require(&self, id: StudentId) -> ServiceResult<Student> {
        match self.repo.get_student(id)? {
            Some(student) => Ok(student),
            None => {
                warn!("event=student_lookup module=service status=not_found student_id={id}");
                Err(ServiceError::NotFound(id))
            }
        }
    }

    fn roll_owner(&self, input: &StudentInput) -> ServiceResult<Option<StudentId>> {
        let roll_number = normalize_roll_number(&input.roll_number);
        if roll_number.is_empty() {
            return Ok(None);
        }
        Ok(self.repo.find_by_roll_number(roll_number)?)
    }
}

fn reject(event: &str, form: StudentForm) -> FormOutcome {
    let fields = form
        .errors
        .iter()
        .map(|err| err.field.as_str())
        .collect::<Vec<_>>()
        .join(",");
    warn!(
        "event={event} module=service status=rejected error_count={} fields={fields}",
        form.errors.len()
    );
    FormOutcome::Invalid(form)
}
