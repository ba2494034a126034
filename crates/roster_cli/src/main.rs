//! Command-line front end for the student roster.
//!
//! # Responsibility
//! - Map command-line arguments onto the roster service operations.
//! - Render pages, forms, notices and errors as plain text or JSON.
//!
//! # Invariants
//! - Deletion only happens when `--confirm` is given.
//! - Storage location comes from `ROSTER_DB_PATH` (see `RosterConfig`).

use clap::{Args, Parser, Subcommand};
use log::info;
use roster_core::db::open_db;
use roster_core::{
    init_from_config, DeleteOutcome, DeleteRequest, FormOutcome, ListParams, RosterConfig,
    ServiceError, SqliteStudentRepository, Student, StudentForm, StudentId, StudentInput,
    StudentListView, StudentService,
};
use serde::Serialize;
use std::error::Error;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(author, version, about = "Manage the student roster", long_about = None)]
struct Cli {
    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List one page of students
    List {
        /// Case-insensitive text matched against name, roll number and email
        #[arg(long)]
        search: Option<String>,
        /// Exact class value (6-10)
        #[arg(long)]
        class: Option<String>,
        /// Sort key, e.g. `name` or `-created_at`
        #[arg(long)]
        sort: Option<String>,
        /// 1-based page number; out-of-range values are clamped
        #[arg(long, allow_hyphen_values = true)]
        page: Option<String>,
    },
    /// Show one student
    Show { id: StudentId },
    /// Add a student
    Add {
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Edit a student; omitted fields keep their stored value
    Edit {
        id: StudentId,
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Delete a student; without --confirm only the prompt is shown
    Delete {
        id: StudentId,
        #[arg(long)]
        confirm: bool,
    },
    /// Print the core version
    Version,
}

/// Form fields shared by `add` and `edit`.
#[derive(Debug, Args)]
struct StudentFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    roll: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    class: Option<String>,
}

impl StudentFields {
    /// Overlays provided flags on top of `base`.
    fn overlay(self, base: StudentInput) -> StudentInput {
        StudentInput {
            name: self.name.unwrap_or(base.name),
            roll_number: self.roll.unwrap_or(base.roll_number),
            email: self.email.unwrap_or(base.email),
            student_class: self.class.unwrap_or(base.student_class),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = RosterConfig::from_env();
    if let Err(err) = init_from_config(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    match run(&config, cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &RosterConfig, cli: Cli) -> CliResult<ExitCode> {
    if let Command::Version = cli.command {
        println!("roster_core version={}", roster_core::core_version());
        return Ok(ExitCode::SUCCESS);
    }

    let conn = open_db(&config.db_path)?;
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn)?);
    let json = cli.json;
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    match cli.command {
        Command::List {
            search,
            class,
            sort,
            page,
        } => {
            let params = ListParams::from_raw(
                search.as_deref(),
                class.as_deref(),
                sort.as_deref(),
                page.as_deref(),
            );
            let view = service.list(&params)?;
            emit(json, &view, render_list)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { id } => match service.get(id) {
            Ok(student) => {
                emit(json, &student, render_student)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => not_found(err),
        },
        Command::Add { fields } => {
            let outcome = service.add(&fields.overlay(StudentInput::default()))?;
            finish_form(json, &outcome)
        }
        Command::Edit { id, fields } => {
            let form = match service.edit_form(id) {
                Ok(form) => form,
                Err(err) => return not_found(err),
            };
            match service.edit(id, &fields.overlay(form.values)) {
                Ok(outcome) => finish_form(json, &outcome),
                Err(err) => not_found(err),
            }
        }
        Command::Delete { id, confirm } => {
            let request = if confirm {
                DeleteRequest::Confirm
            } else {
                DeleteRequest::Prompt
            };
            match service.delete(id, request) {
                Ok(outcome) => {
                    emit(json, &outcome, render_delete)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => not_found(err),
            }
        }
        Command::Version => Ok(ExitCode::SUCCESS),
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::List { .. } => "list",
        Command::Show { .. } => "show",
        Command::Add { .. } => "add",
        Command::Edit { .. } => "edit",
        Command::Delete { .. } => "delete",
        Command::Version => "version",
    }
}

fn emit<T: Serialize>(json: bool, value: &T, render: fn(&T) -> String) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}

fn finish_form(json: bool, outcome: &FormOutcome) -> CliResult<ExitCode> {
    emit(json, outcome, render_outcome)?;
    Ok(match outcome {
        FormOutcome::Saved { .. } => ExitCode::SUCCESS,
        FormOutcome::Invalid(_) => ExitCode::FAILURE,
    })
}

fn not_found(err: ServiceError) -> CliResult<ExitCode> {
    match err {
        ServiceError::NotFound(id) => {
            eprintln!("student {id} not found");
            Ok(ExitCode::FAILURE)
        }
        other => Err(other.into()),
    }
}

fn render_student(student: &Student) -> String {
    format!(
        "#{:<5} {:<30} {:<20} class {:<3} {}",
        student.id,
        student.name,
        student.roll_number,
        student.student_class,
        student.email.as_deref().unwrap_or("-")
    )
}

fn render_list(view: &StudentListView) -> String {
    let page = &view.page;
    let mut lines = page.items.iter().map(render_student).collect::<Vec<_>>();
    if lines.is_empty() {
        lines.push("no students found".to_string());
    }
    lines.push(format!(
        "page {} of {} ({} students, showing {}-{})",
        page.number, page.total_pages, page.total_count, page.start_index, page.end_index
    ));
    lines.join("\n")
}

fn render_form(form: &StudentForm) -> String {
    let mut lines = vec![form.title.to_string()];
    for error in form.errors.iter() {
        lines.push(format!("  {}: {}", error.field, error.message()));
    }
    lines.join("\n")
}

fn render_outcome(outcome: &FormOutcome) -> String {
    match outcome {
        FormOutcome::Saved { student, notice } => {
            format!("{notice}\n{}", render_student(student))
        }
        FormOutcome::Invalid(form) => render_form(form),
    }
}

fn render_delete(outcome: &DeleteOutcome) -> String {
    match outcome {
        DeleteOutcome::ConfirmationRequired { student } => format!(
            "Are you sure you want to delete {student}? Re-run with --confirm to delete."
        ),
        DeleteOutcome::Deleted { student, notice } => format!("{notice} ({student})"),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;
    use roster_core::StudentInput;

    #[test]
    fn delete_takes_id_confirm_and_global_json() {
        let cli =
            Cli::try_parse_from(["roster_cli", "delete", "4", "--confirm", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Delete { id: 4, confirm: true }));
    }

    #[test]
    fn option_without_value_is_an_error() {
        assert!(Cli::try_parse_from(["roster_cli", "list", "--page"]).is_err());
        assert!(Cli::try_parse_from(["roster_cli", "show", "abc"]).is_err());
    }

    #[test]
    fn list_keeps_raw_page_text() {
        let cli = Cli::try_parse_from(["roster_cli", "list", "--page", "-3", "--sort", "name"])
            .unwrap();
        let Command::List { page, sort, .. } = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(page.as_deref(), Some("-3"));
        assert_eq!(sort.as_deref(), Some("name"));
    }

    #[test]
    fn edit_overlays_only_given_flags() {
        let cli = Cli::try_parse_from(["roster_cli", "edit", "1", "--email", "new@school.org"])
            .unwrap();
        let Command::Edit { id, fields } = cli.command else {
            panic!("expected edit command");
        };
        assert_eq!(id, 1);
        let base = StudentInput {
            name: "Amy".to_string(),
            roll_number: "R1".to_string(),
            email: String::new(),
            student_class: "7".to_string(),
        };
        let merged = fields.overlay(base);
        assert_eq!(merged.name, "Amy");
        assert_eq!(merged.roll_number, "R1");
        assert_eq!(merged.email, "new@school.org");
        assert_eq!(merged.student_class, "7");
    }
}
