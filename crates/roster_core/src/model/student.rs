//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical student record and its field constraints.
//! - Own the closed class enumeration shared by validation and queries.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused for another student.
//! - `student_class` is always one of `6|7|8|9|10`.
//! - `updated_at` is never earlier than `created_at`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned primary key.
pub type StudentId = i64;

/// Maximum length of `name`, in characters.
pub const NAME_MAX_CHARS: usize = 100;
/// Maximum length of `roll_number`, in characters.
pub const ROLL_NUMBER_MAX_CHARS: usize = 20;

/// Grade a student is enrolled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum StudentClass {
    #[default]
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
}

impl StudentClass {
    /// Every permitted class, in ascending grade order.
    pub const ALL: [StudentClass; 5] = [
        StudentClass::Six,
        StudentClass::Seven,
        StudentClass::Eight,
        StudentClass::Nine,
        StudentClass::Ten,
    ];

    /// Stored/wire value (`"6"`..`"10"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
        }
    }

    /// Human-readable label shown in selection controls.
    pub fn label(self) -> &'static str {
        match self {
            Self::Six => "Class 6",
            Self::Seven => "Class 7",
            Self::Eight => "Class 8",
            Self::Nine => "Class 9",
            Self::Ten => "Class 10",
        }
    }

    /// Numeric grade, used for ordering.
    pub fn grade(self) -> u8 {
        match self {
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::Ten => 10,
        }
    }

    /// Parses an exact stored value. Returns `None` for anything outside the
    /// enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == value)
    }
}

impl Display for StudentClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value/label pair surfaced to selection controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassChoice {
    pub value: &'static str,
    pub label: &'static str,
}

/// Returns the class enumeration as value/label pairs.
pub fn class_choices() -> Vec<ClassChoice> {
    StudentClass::ALL
        .into_iter()
        .map(|class| ClassChoice {
            value: class.as_str(),
            label: class.label(),
        })
        .collect()
}

/// Named fields of a student, used to scope validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentField {
    Name,
    RollNumber,
    Email,
    StudentClass,
}

impl StudentField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::RollNumber => "roll_number",
            Self::Email => "email",
            Self::StudentClass => "student_class",
        }
    }
}

impl Display for StudentField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub roll_number: String,
    /// `None` when no email was provided.
    pub email: Option<String>,
    pub student_class: StudentClass,
    /// Unix epoch milliseconds; fixed at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds; refreshed on every successful edit.
    pub updated_at: i64,
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (Roll: {})", self.name, self.roll_number)
    }
}

/// Raw form submission for add/edit.
///
/// Values are kept exactly as entered so an invalid submission can be shown
/// back to the user unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInput {
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub student_class: String,
}

impl Default for StudentInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            roll_number: String::new(),
            email: String::new(),
            student_class: StudentClass::default().as_str().to_string(),
        }
    }
}

impl From<&Student> for StudentInput {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            roll_number: student.roll_number.clone(),
            email: student.email.clone().unwrap_or_default(),
            student_class: student.student_class.as_str().to_string(),
        }
    }
}

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{class_choices, Student, StudentClass, StudentInput};

    #[test]
    fn class_parse_accepts_only_enumerated_values() {
        assert_eq!(StudentClass::parse("10"), Some(StudentClass::Ten));
        assert_eq!(StudentClass::parse("6"), Some(StudentClass::Six));
        assert_eq!(StudentClass::parse("5"), None);
        assert_eq!(StudentClass::parse(" 7"), None);
        assert_eq!(StudentClass::parse(""), None);
    }

    #[test]
    fn class_order_follows_grade_not_text() {
        assert!(StudentClass::Ten > StudentClass::Nine);
        assert!(StudentClass::Six < StudentClass::Seven);
    }

    #[test]
    fn choices_cover_every_class_with_labels() {
        let choices = class_choices();
        assert_eq!(choices.len(), 5);
        assert_eq!(choices[0].value, "6");
        assert_eq!(choices[4].label, "Class 10");
    }

    #[test]
    fn default_input_preselects_class_six() {
        assert_eq!(StudentInput::default().student_class, "6");
    }

    #[test]
    fn display_includes_roll_number() {
        let student = Student {
            id: 1,
            name: "Amy".to_string(),
            roll_number: "R1".to_string(),
            email: None,
            student_class: StudentClass::Six,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(student.to_string(), "Amy (Roll: R1)");
    }
}
