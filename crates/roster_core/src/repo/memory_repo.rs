//! In-memory student repository.
//!
//! # Responsibility
//! - Back the student service without a database (tests, previews).
//! - Evaluate `StudentQuery` steps with the same semantics as SQLite.
//!
//! # Invariants
//! - Ids are assigned from a monotonic counter and never reused.
//! - Roll-number uniqueness is enforced on every write.

use crate::model::student::{now_epoch_ms, Student, StudentId};
use crate::query::StudentQuery;
use crate::repo::student_repo::{RepoError, RepoResult, StudentRepository};
use crate::validation::ValidatedStudent;
use std::cell::RefCell;

#[derive(Debug, Default)]
struct MemoryState {
    students: Vec<Student>,
    last_id: StudentId,
}

/// Single-threaded repository holding students in a `Vec`.
#[derive(Debug, Default)]
pub struct MemoryStudentRepository {
    state: RefCell<MemoryState>,
}

impl MemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with already-persisted records.
    ///
    /// The id counter continues after the highest seeded id.
    pub fn with_students(students: Vec<Student>) -> Self {
        let last_id = students.iter().map(|student| student.id).max().unwrap_or(0);
        Self {
            state: RefCell::new(MemoryState { students, last_id }),
        }
    }

    /// Snapshot of every stored record, unordered.
    pub fn snapshot(&self) -> Vec<Student> {
        self.state.borrow().students.clone()
    }
}

impl StudentRepository for MemoryStudentRepository {
    fn create_student(&self, student: &ValidatedStudent) -> RepoResult<Student> {
        let mut state = self.state.borrow_mut();
        if roll_owner(&state, &student.roll_number).is_some() {
            return Err(RepoError::DuplicateRollNumber(student.roll_number.clone()));
        }

        state.last_id += 1;
        let now = now_epoch_ms();
        let created = Student {
            id: state.last_id,
            name: student.name.clone(),
            roll_number: student.roll_number.clone(),
            email: student.email.clone(),
            student_class: student.student_class,
            created_at: now,
            updated_at: now,
        };
        state.students.push(created.clone());
        Ok(created)
    }

    fn update_student(&self, id: StudentId, student: &ValidatedStudent) -> RepoResult<Student> {
        let mut state = self.state.borrow_mut();
        if roll_owner(&state, &student.roll_number).is_some_and(|owner| owner != id) {
            return Err(RepoError::DuplicateRollNumber(student.roll_number.clone()));
        }

        let existing = state
            .students
            .iter_mut()
            .find(|current| current.id == id)
            .ok_or(RepoError::NotFound(id))?;
        existing.name = student.name.clone();
        existing.roll_number = student.roll_number.clone();
        existing.email = student.email.clone();
        existing.student_class = student.student_class;
        existing.updated_at = now_epoch_ms().max(existing.created_at);
        Ok(existing.clone())
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        Ok(self
            .state
            .borrow()
            .students
            .iter()
            .find(|student| student.id == id)
            .cloned())
    }

    fn find_by_roll_number(&self, roll_number: &str) -> RepoResult<Option<StudentId>> {
        Ok(roll_owner(&self.state.borrow(), roll_number))
    }

    fn count_students(&self, query: &StudentQuery) -> RepoResult<usize> {
        Ok(self
            .state
            .borrow()
            .students
            .iter()
            .filter(|student| query.matches(student))
            .count())
    }

    fn list_students(
        &self,
        query: &StudentQuery,
        limit: usize,
        offset: usize,
    ) -> RepoResult<Vec<Student>> {
        let ordered = query.apply(self.state.borrow().students.iter().cloned());
        Ok(ordered.into_iter().skip(offset).take(limit).collect())
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let mut state = self.state.borrow_mut();
        let before = state.students.len();
        state.students.retain(|student| student.id != id);
        if state.students.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn roll_owner(state: &MemoryState, roll_number: &str) -> Option<StudentId> {
    state
        .students
        .iter()
        .find(|student| student.roll_number == roll_number)
        .map(|student| student.id)
}
