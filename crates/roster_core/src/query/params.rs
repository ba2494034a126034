//! List request parameters and composable query steps.
//!
//! # Responsibility
//! - Parse untrusted list parameters into typed filters and a sort key.
//! - Evaluate those steps against in-memory records.
//!
//! # Invariants
//! - Only whitelisted sort keys become a `SortKey`; anything else resolves to
//!   `-created_at`.
//! - Parsing never fails; malformed values degrade to defaults.

use crate::model::student::Student;
use serde::Serialize;
use std::cmp::Ordering;

/// Sort keys accepted from callers. A leading `-` means descending.
pub const ALLOWED_SORT_KEYS: [&str; 8] = [
    "name",
    "-name",
    "roll_number",
    "-roll_number",
    "student_class",
    "-student_class",
    "created_at",
    "-created_at",
];

/// Column a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    RollNumber,
    StudentClass,
    CreatedAt,
}

/// Whitelisted ordering for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl SortKey {
    /// Newest first.
    pub const DEFAULT: SortKey = SortKey {
        field: SortField::CreatedAt,
        descending: true,
    };

    /// Parses one of [`ALLOWED_SORT_KEYS`]. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "name" => SortField::Name,
            "roll_number" => SortField::RollNumber,
            "student_class" => SortField::StudentClass,
            "created_at" => SortField::CreatedAt,
            _ => return None,
        };
        Some(Self { field, descending })
    }

    /// Parses `raw`, falling back to [`SortKey::DEFAULT`].
    pub fn resolve(raw: &str) -> Self {
        Self::parse(raw).unwrap_or(Self::DEFAULT)
    }

    /// Canonical key text, e.g. `-created_at`.
    pub fn as_str(self) -> &'static str {
        match (self.field, self.descending) {
            (SortField::Name, false) => "name",
            (SortField::Name, true) => "-name",
            (SortField::RollNumber, false) => "roll_number",
            (SortField::RollNumber, true) => "-roll_number",
            (SortField::StudentClass, false) => "student_class",
            (SortField::StudentClass, true) => "-student_class",
            (SortField::CreatedAt, false) => "created_at",
            (SortField::CreatedAt, true) => "-created_at",
        }
    }

    /// Orders two records by this key, breaking ties on `id` in the same
    /// direction.
    pub fn compare(self, left: &Student, right: &Student) -> Ordering {
        let primary = match self.field {
            SortField::Name => left.name.cmp(&right.name),
            SortField::RollNumber => left.roll_number.cmp(&right.roll_number),
            SortField::StudentClass => left.student_class.cmp(&right.student_class),
            SortField::CreatedAt => left.created_at.cmp(&right.created_at),
        };
        let ordering = primary.then_with(|| left.id.cmp(&right.id));
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One composable filter step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentFilter {
    /// Case-insensitive substring over name, roll number and email.
    Search(String),
    /// Exact match on the stored class value.
    Class(String),
}

impl StudentFilter {
    /// Builds a search step. Returns `None` for blank text.
    pub fn search(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| Self::Search(trimmed.to_string()))
    }

    /// Builds a class step. Returns `None` for an empty value.
    pub fn class(value: &str) -> Option<Self> {
        (!value.is_empty()).then(|| Self::Class(value.to_string()))
    }

    pub fn matches(&self, student: &Student) -> bool {
        match self {
            Self::Search(text) => {
                let needle = text.to_lowercase();
                contains_folded(&student.name, &needle)
                    || contains_folded(&student.roll_number, &needle)
                    || student
                        .email
                        .as_deref()
                        .is_some_and(|email| contains_folded(email, &needle))
            }
            Self::Class(value) => student.student_class.as_str() == value,
        }
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

/// Ordered filter steps plus one sort key, independent of storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentQuery {
    filters: Vec<StudentFilter>,
    sort: SortKey,
}

impl StudentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter step; steps are combined with logical AND.
    pub fn filter(mut self, step: StudentFilter) -> Self {
        self.filters.push(step);
        self
    }

    pub fn sort_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn filters(&self) -> &[StudentFilter] {
        &self.filters
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn matches(&self, student: &Student) -> bool {
        self.filters.iter().all(|step| step.matches(student))
    }

    /// Runs every step over an in-memory record set.
    pub fn apply(&self, records: impl IntoIterator<Item = Student>) -> Vec<Student> {
        let mut kept = records
            .into_iter()
            .filter(|student| self.matches(student))
            .collect::<Vec<_>>();
        kept.sort_by(|left, right| self.sort.compare(left, right));
        kept
    }
}

/// Raw list parameters as received from a request.
///
/// Values are echoed back untouched so controls can be re-rendered with the
/// prior state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    pub search: String,
    pub class_filter: String,
    pub sort: String,
    /// 1-based page request; `None` means the first page.
    pub page: Option<i64>,
}

impl ListParams {
    /// Builds parameters from optional query-string values.
    pub fn from_raw(
        search: Option<&str>,
        class_filter: Option<&str>,
        sort: Option<&str>,
        page: Option<&str>,
    ) -> Self {
        Self {
            search: search.unwrap_or_default().to_string(),
            class_filter: class_filter.unwrap_or_default().to_string(),
            sort: sort.unwrap_or_default().to_string(),
            page: parse_page(page),
        }
    }

    /// Resolved sort key with whitelist fallback.
    pub fn sort_key(&self) -> SortKey {
        SortKey::resolve(&self.sort)
    }

    /// Query steps in fixed order: search, class filter, sort.
    pub fn to_query(&self) -> StudentQuery {
        let mut query = StudentQuery::new();
        if let Some(step) = StudentFilter::search(&self.search) {
            query = query.filter(step);
        }
        if let Some(step) = StudentFilter::class(&self.class_filter) {
            query = query.filter(step);
        }
        query.sort_by(self.sort_key())
    }
}

/// Parses a raw page value. Non-numeric input is treated as absent.
///
/// Integers outside the `i64` range saturate so they still clamp to the
/// nearest valid page.
pub fn parse_page(raw: Option<&str>) -> Option<i64> {
    let value = raw?.trim();
    if let Ok(page) = value.parse::<i64>() {
        return Some(page);
    }

    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::{parse_page, ListParams, SortField, SortKey, StudentFilter, ALLOWED_SORT_KEYS};

    #[test]
    fn every_allowed_key_parses_and_round_trips() {
        for key in ALLOWED_SORT_KEYS {
            let parsed = SortKey::parse(key).unwrap();
            assert_eq!(parsed.as_str(), key);
        }
    }

    #[test]
    fn unknown_or_hostile_keys_resolve_to_default() {
        for raw in ["", "-", "--name", "email", "id", "name;", "'; DROP TABLE students;"] {
            assert_eq!(SortKey::resolve(raw), SortKey::DEFAULT, "{raw}");
        }
        assert_eq!(SortKey::DEFAULT.field, SortField::CreatedAt);
        assert!(SortKey::DEFAULT.descending);
    }

    #[test]
    fn parse_page_ignores_non_numeric_values() {
        assert_eq!(parse_page(Some("3")), Some(3));
        assert_eq!(parse_page(Some(" -2 ")), Some(-2));
        assert_eq!(parse_page(Some("two")), None);
        assert_eq!(parse_page(Some("99999999999999999999")), Some(i64::MAX));
        assert_eq!(parse_page(Some("-99999999999999999999")), Some(i64::MIN));
        assert_eq!(parse_page(Some("1e30")), None);
        assert_eq!(parse_page(Some("-")), None);
        assert_eq!(parse_page(Some("")), None);
        assert_eq!(parse_page(None), None);
    }

    #[test]
    fn blank_steps_are_skipped() {
        assert_eq!(StudentFilter::search("   "), None);
        assert_eq!(StudentFilter::class(""), None);

        let params = ListParams::from_raw(Some(" "), Some(""), Some("bogus"), Some("x"));
        let query = params.to_query();
        assert!(query.filters().is_empty());
        assert_eq!(query.sort(), SortKey::DEFAULT);
        assert_eq!(params.page, None);
        assert_eq!(params.sort, "bogus");
    }
}
