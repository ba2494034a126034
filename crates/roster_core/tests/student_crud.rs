use roster_core::db::open_db_in_memory;
use roster_core::{
    MemoryStudentRepository, RepoError, SqliteStudentRepository, StudentClass, StudentQuery,
    StudentRepository, ValidatedStudent,
};

fn validated(name: &str, roll: &str, email: Option<&str>, class: StudentClass) -> ValidatedStudent {
    ValidatedStudent {
        name: name.to_string(),
        roll_number: roll.to_string(),
        email: email.map(str::to_string),
        student_class: class,
    }
}

fn exercise_create_get_update_delete(repo: &impl StudentRepository) {
    let created = repo
        .create_student(&validated("Amy", "R1", Some("amy@school.org"), StudentClass::Seven))
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.created_at, created.updated_at);

    let loaded = repo.get_student(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(repo.find_by_roll_number("R1").unwrap(), Some(created.id));
    assert_eq!(repo.find_by_roll_number("R2").unwrap(), None);

    let updated = repo
        .update_student(created.id, &validated("Amy Lee", "R9", None, StudentClass::Ten))
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Amy Lee");
    assert_eq!(updated.roll_number, "R9");
    assert_eq!(updated.email, None);
    assert_eq!(updated.student_class, StudentClass::Ten);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(repo.find_by_roll_number("R1").unwrap(), None);

    repo.delete_student(created.id).unwrap();
    assert_eq!(repo.get_student(created.id).unwrap(), None);
    assert_eq!(repo.count_students(&StudentQuery::new()).unwrap(), 0);
}

fn exercise_duplicate_roll_numbers(repo: &impl StudentRepository) {
    let first = repo
        .create_student(&validated("Amy", "R1", None, StudentClass::Six))
        .unwrap();
    let second = repo
        .create_student(&validated("Ben", "R2", None, StudentClass::Six))
        .unwrap();

    let err = repo
        .create_student(&validated("Cat", "R1", None, StudentClass::Six))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateRollNumber(ref roll) if roll == "R1"));

    let err = repo
        .update_student(second.id, &validated("Ben", "R1", None, StudentClass::Six))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateRollNumber(_)));

    repo.update_student(first.id, &validated("Amy", "R1", None, StudentClass::Eight))
        .unwrap();
    assert_eq!(repo.count_students(&StudentQuery::new()).unwrap(), 2);
}

fn exercise_missing_targets(repo: &impl StudentRepository) {
    let err = repo
        .update_student(404, &validated("Amy", "R1", None, StudentClass::Six))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));

    let err = repo.delete_student(404).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));
    assert_eq!(repo.get_student(404).unwrap(), None);
}

#[test]
fn sqlite_create_get_update_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    exercise_create_get_update_delete(&repo);
}

#[test]
fn memory_create_get_update_delete() {
    exercise_create_get_update_delete(&MemoryStudentRepository::new());
}

#[test]
fn sqlite_rejects_duplicate_roll_numbers() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    exercise_duplicate_roll_numbers(&repo);
}

#[test]
fn memory_rejects_duplicate_roll_numbers() {
    exercise_duplicate_roll_numbers(&MemoryStudentRepository::new());
}

#[test]
fn sqlite_reports_missing_targets() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    exercise_missing_targets(&repo);
}

#[test]
fn memory_reports_missing_targets() {
    exercise_missing_targets(&MemoryStudentRepository::new());
}

#[test]
fn sqlite_ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let first = repo
        .create_student(&validated("Amy", "R1", None, StudentClass::Six))
        .unwrap();
    repo.delete_student(first.id).unwrap();
    let second = repo
        .create_student(&validated("Ben", "R1", None, StudentClass::Six))
        .unwrap();
    assert!(second.id > first.id);
}

#[test]
fn sqlite_update_never_moves_updated_at_before_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let created = repo
        .create_student(&validated("Amy", "R1", None, StudentClass::Six))
        .unwrap();

    let future = created.created_at + 3_600_000;
    conn.execute(
        "UPDATE students SET created_at = ?1, updated_at = ?1 WHERE id = ?2;",
        rusqlite::params![future, created.id],
    )
    .unwrap();

    let updated = repo
        .update_student(created.id, &validated("Amy", "R1", None, StudentClass::Seven))
        .unwrap();
    assert_eq!(updated.created_at, future);
    assert_eq!(updated.updated_at, future);
}
