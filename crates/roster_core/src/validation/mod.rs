//! Student form validation.
//!
//! # Responsibility
//! - Turn raw `StudentInput` into a `ValidatedStudent` ready for persistence.
//! - Report every field violation in one pass.
//!
//! # Invariants
//! - Validation is pure: uniqueness is decided from a caller-supplied
//!   roll-number owner, never by touching storage.
//! - Checks run in a fixed order: required, length, uniqueness, email, class.

use crate::model::student::{
    StudentClass, StudentField, StudentId, StudentInput, NAME_MAX_CHARS, ROLL_NUMBER_MAX_CHARS,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length of `email`, in characters.
pub const EMAIL_MAX_CHARS: usize = 254;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$",
    )
    .expect("valid email regex")
});

/// Student data that passed every field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedStudent {
    pub name: String,
    pub roll_number: String,
    pub email: Option<String>,
    pub student_class: StudentClass,
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    TooLong { max: usize, actual: usize },
    Duplicate,
    InvalidEmail,
    InvalidChoice { value: String },
}

/// One field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: StudentField,
    #[serde(flatten)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    fn new(field: StudentField, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }

    /// User-facing message for this failure.
    pub fn message(&self) -> String {
        match &self.kind {
            FieldErrorKind::Required => "This field is required.".to_string(),
            FieldErrorKind::TooLong { max, actual } => format!(
                "Ensure this value has at most {max} characters (it has {actual})."
            ),
            FieldErrorKind::Duplicate => "Student with this Roll number already exists.".to_string(),
            FieldErrorKind::InvalidEmail => "Enter a valid email address.".to_string(),
            FieldErrorKind::InvalidChoice { value } => format!(
                "Select a valid choice. {value} is not one of the available choices."
            ),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message())
    }
}

/// Every violation found in one submission, in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a single duplicate roll-number failure.
    ///
    /// Used when storage rejects a write that raced past the pre-check.
    pub fn duplicate_roll_number() -> Self {
        Self {
            errors: vec![FieldError::new(
                StudentField::RollNumber,
                FieldErrorKind::Duplicate,
            )],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Failures scoped to one field.
    pub fn for_field(&self, field: StudentField) -> Vec<&FieldError> {
        self.errors.iter().filter(|err| err.field == field).collect()
    }

    pub fn has_field(&self, field: StudentField) -> bool {
        self.errors.iter().any(|err| err.field == field)
    }

    fn push(&mut self, field: StudentField, kind: FieldErrorKind) {
        self.errors.push(FieldError::new(field, kind));
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid student: {joined}")
    }
}

impl Error for ValidationErrors {}

/// Normalized roll number used for both validation and owner lookup.
pub fn normalize_roll_number(raw: &str) -> &str {
    raw.trim()
}

/// Validates one add/edit submission.
///
/// `editing` is the id of the student being edited, if any. `roll_owner` is
/// the id of the existing student that already holds the submitted roll
/// number, if any.
///
/// # Errors
/// - Returns all field failures when any check fails.
pub fn validate_student(
    input: &StudentInput,
    editing: Option<StudentId>,
    roll_owner: Option<StudentId>,
) -> Result<ValidatedStudent, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = input.name.trim();
    let roll_number = normalize_roll_number(&input.roll_number);
    let email = input.email.trim();
    let class_text = input.student_class.trim();

    if name.is_empty() {
        errors.push(StudentField::Name, FieldErrorKind::Required);
    }
    if roll_number.is_empty() {
        errors.push(StudentField::RollNumber, FieldErrorKind::Required);
    }

    check_length(&mut errors, StudentField::Name, name, NAME_MAX_CHARS);
    check_length(
        &mut errors,
        StudentField::RollNumber,
        roll_number,
        ROLL_NUMBER_MAX_CHARS,
    );
    check_length(&mut errors, StudentField::Email, email, EMAIL_MAX_CHARS);

    if !roll_number.is_empty() {
        if let Some(owner) = roll_owner {
            if Some(owner) != editing {
                errors.push(StudentField::RollNumber, FieldErrorKind::Duplicate);
            }
        }
    }

    if !email.is_empty() && !EMAIL_RE.is_match(email) {
        errors.push(StudentField::Email, FieldErrorKind::InvalidEmail);
    }

    let student_class = if class_text.is_empty() {
        Some(StudentClass::default())
    } else {
        StudentClass::parse(class_text)
    };
    if student_class.is_none() {
        errors.push(
            StudentField::StudentClass,
            FieldErrorKind::InvalidChoice {
                value: class_text.to_string(),
            },
        );
    }

    match student_class {
        Some(student_class) if errors.is_empty() => Ok(ValidatedStudent {
            name: name.to_string(),
            roll_number: roll_number.to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            student_class,
        }),
        _ => Err(errors),
    }
}

fn check_length(errors: &mut ValidationErrors, field: StudentField, value: &str, max: usize) {
    let actual = value.chars().count();
    if actual > max {
        errors.push(field, FieldErrorKind::TooLong { max, actual });
    }
}
