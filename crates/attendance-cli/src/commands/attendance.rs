//! Daily attendance CLI commands.

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use attendance_client::{Action, ClassSelector};
use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;
use attendance_core::types::{AttendanceStatus, ClassId, StudentId};

use crate::output::{self, OutputFormat};
use crate::render;

/// Arguments for attendance commands
#[derive(Debug, Args)]
pub struct AttendanceArgs {
    /// Attendance subcommand
    #[command(subcommand)]
    pub command: AttendanceCommand,
}

/// Attendance subcommands
#[derive(Debug, Subcommand)]
pub enum AttendanceCommand {
    /// Show attendance for a date
    Show {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        /// Class ID (defaults to the first class unless --all-classes)
        #[arg(short, long)]
        class: Option<ClassId>,
        /// Every class (admin)
        #[arg(long)]
        all_classes: bool,
    },
    /// Edit and save the attendance sheet of one class for one date
    Edit {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        /// Class ID (defaults to the first class)
        #[arg(short, long)]
        class: Option<ClassId>,
        /// Set every student to this status first
        #[arg(long, value_name = "STATUS")]
        all: Option<AttendanceStatus>,
        /// Set one student, e.g. `--set 11=excused` (repeatable)
        #[arg(long = "set", value_name = "ID=STATUS", value_parser = parse_assignment)]
        assignments: Vec<(StudentId, AttendanceStatus)>,
        /// Print the edited sheet without saving
        #[arg(long)]
        dry_run: bool,
    },
}

/// Execute attendance commands
pub async fn execute(
    args: &AttendanceArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut app = super::open_session(config).await?;

    match &args.command {
        AttendanceCommand::Show {
            date,
            class,
            all_classes,
        } => {
            let target = super::target_class(*class, *all_classes, app.selection().classes());
            if target.is_some() {
                app.perform(Action::ChooseClass {
                    selector: ClassSelector::AttendanceOverview,
                    class_id: target,
                })
                .await?;
            }
            app.perform(Action::LoadAttendance {
                date: *date,
                all_classes: *all_classes,
            })
            .await?;
            output::print_rendered(&render::overview(app.overview(), format));
        }
        AttendanceCommand::Edit {
            date,
            class,
            all,
            assignments,
            dry_run,
        } => {
            let target = super::target_class(*class, false, app.selection().classes());
            if target.is_some() {
                app.perform(Action::ChooseClass {
                    selector: ClassSelector::AttendanceEdit,
                    class_id: target,
                })
                .await?;
            }
            app.perform(Action::SetEditDate(Some(*date))).await?;
            app.perform(Action::LoadAttendanceForEdit).await?;

            if let Some(status) = all {
                app.perform(Action::SetAllStatuses(*status)).await?;
            }
            for (student_id, status) in assignments {
                app.perform(Action::SetStudentStatus {
                    student_id: *student_id,
                    status: *status,
                })
                .await?;
            }

            if *dry_run {
                output::print_warning("Dry run: nothing was saved");
            } else {
                let message = app.perform(Action::SaveAttendance).await?;
                output::print_success(&message);
            }
            output::print_rendered(&render::edit_sheet(app.edit(), format));
        }
    }

    Ok(())
}

/// Parse `ID=STATUS`
fn parse_assignment(raw: &str) -> Result<(StudentId, AttendanceStatus), String> {
    let (id, status) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=STATUS, got '{raw}'"))?;
    let id = id
        .parse::<StudentId>()
        .map_err(|e| format!("invalid student id '{id}': {e}"))?;
    let status = status
        .parse::<AttendanceStatus>()
        .map_err(|e| e.message)?;
    Ok((id, status))
}
