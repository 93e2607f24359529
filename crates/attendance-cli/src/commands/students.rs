//! Student roster CLI commands.
//!
//! Every subcommand works on one class, which becomes the shared selection.

use clap::{Args, Subcommand};

use attendance_client::Action;
use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;
use attendance_core::types::{ClassId, StudentId};

use crate::output::{self, OutputFormat};
use crate::render;

/// Arguments for student commands
#[derive(Debug, Args)]
pub struct StudentsArgs {
    /// Student subcommand
    #[command(subcommand)]
    pub command: StudentCommand,
}

/// Student subcommands
#[derive(Debug, Subcommand)]
pub enum StudentCommand {
    /// List the students of a class
    List {
        /// Class ID
        #[arg(short, long)]
        class: ClassId,
    },
    /// Add a student to a class
    Add {
        /// Class ID
        #[arg(short, long)]
        class: ClassId,
        /// Full name
        full_name: String,
    },
    /// Rename or (de)activate a student
    Update {
        /// Class ID the student belongs to
        #[arg(short, long)]
        class: ClassId,
        /// Student ID
        student: StudentId,
        /// New full name
        #[arg(long)]
        name: Option<String>,
        /// Active flag
        #[arg(long)]
        active: Option<bool>,
    },
}

/// Execute student commands
pub async fn execute(
    args: &StudentsArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut app = super::open_session(config).await?;

    let class = match &args.command {
        StudentCommand::List { class }
        | StudentCommand::Add { class, .. }
        | StudentCommand::Update { class, .. } => *class,
    };
    app.perform(Action::SelectClass(class)).await?;

    match &args.command {
        StudentCommand::List { .. } => {}
        StudentCommand::Add { full_name, .. } => {
            let message = app
                .perform(Action::AddStudent {
                    full_name: full_name.clone(),
                })
                .await?;
            output::print_success(&message);
        }
        StudentCommand::Update {
            student,
            name,
            active,
            ..
        } => {
            let message = app
                .perform(Action::UpdateStudent {
                    student_id: Some(*student),
                    full_name: name.clone(),
                    is_active: *active,
                })
                .await?;
            output::print_success(&message);
        }
    }

    output::print_rendered(&render::roster(app.selection(), format));
    Ok(())
}
