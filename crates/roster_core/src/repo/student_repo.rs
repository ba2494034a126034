//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and list primitives over the `students` table.
//! - Compile storage-agnostic `StudentQuery` steps into parameterized SQL.
//!
//! # Invariants
//! - Writes only accept `ValidatedStudent` values.
//! - Sort order reaches SQL only through the typed `SortKey`; caller text is
//!   never spliced into a statement.
//! - A `UNIQUE` failure on `roll_number` surfaces as
//!   `RepoError::DuplicateRollNumber`.

use crate::db::{register_functions, DbError};
use crate::model::student::{now_epoch_ms, Student, StudentClass, StudentId};
use crate::query::{SortField, SortKey, StudentFilter, StudentQuery};
use crate::validation::ValidatedStudent;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    roll_number,
    email,
    student_class,
    created_at,
    updated_at
FROM students";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(StudentId),
    /// Storage rejected a write because the roll number is taken.
    DuplicateRollNumber(String),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::DuplicateRollNumber(roll) => {
                write!(f, "roll number `{roll}` is already in use")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::DuplicateRollNumber(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence interface consumed by the student service.
pub trait StudentRepository {
    /// Inserts a student, stamping both timestamps.
    fn create_student(&self, student: &ValidatedStudent) -> RepoResult<Student>;
    /// Replaces editable fields and refreshes `updated_at`.
    fn update_student(&self, id: StudentId, student: &ValidatedStudent) -> RepoResult<Student>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Returns the id of the student holding `roll_number`, if any.
    fn find_by_roll_number(&self, roll_number: &str) -> RepoResult<Option<StudentId>>;
    /// Counts students matching every filter step.
    fn count_students(&self, query: &StudentQuery) -> RepoResult<usize>;
    /// Lists matching students in query order.
    fn list_students(
        &self,
        query: &StudentQuery,
        limit: usize,
        offset: usize,
    ) -> RepoResult<Vec<Student>>;
    /// Permanently removes a student.
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'students'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable("students"));
        }
        // Connections opened outside `open_db` lack the search fold function.
        register_functions(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &ValidatedStudent) -> RepoResult<Student> {
        let now = now_epoch_ms();
        self.conn
            .execute(
                "INSERT INTO students (
                    name,
                    roll_number,
                    email,
                    student_class,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
                params![
                    student.name.as_str(),
                    student.roll_number.as_str(),
                    student.email.as_deref(),
                    student.student_class.as_str(),
                    now,
                ],
            )
            .map_err(|err| map_write_error(err, &student.roll_number))?;

        Ok(Student {
            id: self.conn.last_insert_rowid(),
            name: student.name.clone(),
            roll_number: student.roll_number.clone(),
            email: student.email.clone(),
            student_class: student.student_class,
            created_at: now,
            updated_at: now,
        })
    }

    fn update_student(&self, id: StudentId, student: &ValidatedStudent) -> RepoResult<Student> {
        let changed = self
            .conn
            .execute(
                "UPDATE students
                 SET
                    name = ?2,
                    roll_number = ?3,
                    email = ?4,
                    student_class = ?5,
                    updated_at = MAX(?6, created_at)
                 WHERE id = ?1;",
                params![
                    id,
                    student.name.as_str(),
                    student.roll_number.as_str(),
                    student.email.as_deref(),
                    student.student_class.as_str(),
                    now_epoch_ms(),
                ],
            )
            .map_err(|err| map_write_error(err, &student.roll_number))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.get_student(id)?.ok_or(RepoError::NotFound(id))
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn find_by_roll_number(&self, roll_number: &str) -> RepoResult<Option<StudentId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM students WHERE roll_number = ?1;",
                [roll_number],
                |row| row.get::<_, StudentId>(0),
            )
            .optional()?;
        Ok(id)
    }

    fn count_students(&self, query: &StudentQuery) -> RepoResult<usize> {
        let mut sql = String::from("SELECT COUNT(*) FROM students WHERE 1 = 1");
        let mut bind_values = Vec::new();
        push_filter_clauses(query, &mut sql, &mut bind_values);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative student count `{count}`")))
    }

    fn list_students(
        &self,
        query: &StudentQuery,
        limit: usize,
        offset: usize,
    ) -> RepoResult<Vec<Student>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values = Vec::new();
        push_filter_clauses(query, &mut sql, &mut bind_values);

        sql.push_str(" ORDER BY ");
        sql.push_str(order_by_sql(query.sort()));
        sql.push_str(" LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(to_sql_int(limit)));
        bind_values.push(Value::Integer(to_sql_int(offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn push_filter_clauses(query: &StudentQuery, sql: &mut String, bind_values: &mut Vec<Value>) {
    for step in query.filters() {
        match step {
            StudentFilter::Search(text) => {
                sql.push_str(
                    " AND (instr(roster_fold(name), ?) > 0
                        OR instr(roster_fold(roll_number), ?) > 0
                        OR instr(roster_fold(email), ?) > 0)",
                );
                let needle = text.to_lowercase();
                for _ in 0..3 {
                    bind_values.push(Value::Text(needle.clone()));
                }
            }
            StudentFilter::Class(value) => {
                sql.push_str(" AND student_class = ?");
                bind_values.push(Value::Text(value.clone()));
            }
        }
    }
}

fn order_by_sql(sort: SortKey) -> &'static str {
    match (sort.field, sort.descending) {
        (SortField::Name, false) => "name ASC, id ASC",
        (SortField::Name, true) => "name DESC, id DESC",
        (SortField::RollNumber, false) => "roll_number ASC, id ASC",
        (SortField::RollNumber, true) => "roll_number DESC, id DESC",
        (SortField::StudentClass, false) => "CAST(student_class AS INTEGER) ASC, id ASC",
        (SortField::StudentClass, true) => "CAST(student_class AS INTEGER) DESC, id DESC",
        (SortField::CreatedAt, false) => "created_at ASC, id ASC",
        (SortField::CreatedAt, true) => "created_at DESC, id DESC",
    }
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_write_error(err: rusqlite::Error, roll_number: &str) -> RepoError {
    let err = DbError::Sqlite(err);
    if err.is_unique_violation("students", "roll_number") {
        return RepoError::DuplicateRollNumber(roll_number.to_string());
    }
    RepoError::Db(err)
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let class_text: String = row.get("student_class")?;
    let student_class = StudentClass::parse(&class_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid class `{class_text}` in students.student_class"
        ))
    })?;

    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        roll_number: row.get("roll_number")?,
        email: row.get("email")?,
        student_class,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::order_by_sql;
    use crate::query::{SortKey, ALLOWED_SORT_KEYS};

    #[test]
    fn order_by_is_built_from_fixed_fragments_only() {
        for key in ALLOWED_SORT_KEYS {
            let fragment = order_by_sql(SortKey::resolve(key));
            assert!(fragment.ends_with("id ASC") || fragment.ends_with("id DESC"));
        }
        assert_eq!(
            order_by_sql(SortKey::resolve("'; DROP TABLE students;")),
            "created_at DESC, id DESC"
        );
    }
}
