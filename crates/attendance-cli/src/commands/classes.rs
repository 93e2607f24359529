//! Class management CLI commands.

use clap::{Args, Subcommand};

use attendance_client::Action;
use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;
use attendance_core::types::UserId;

use crate::output::{self, OutputFormat};
use crate::render;

/// Arguments for class commands
#[derive(Debug, Args)]
pub struct ClassesArgs {
    /// Class subcommand
    #[command(subcommand)]
    pub command: ClassCommand,
}

/// Class subcommands
#[derive(Debug, Subcommand)]
pub enum ClassCommand {
    /// List classes
    List,
    /// Create a class (admin)
    Create {
        /// Class name
        name: String,
        /// Teacher ID
        #[arg(short, long)]
        teacher: UserId,
    },
}

/// Execute class commands
pub async fn execute(
    args: &ClassesArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut app = super::open_session(config).await?;

    match &args.command {
        ClassCommand::List => {}
        ClassCommand::Create { name, teacher } => {
            let message = app
                .perform(Action::CreateClass {
                    name: name.clone(),
                    teacher_id: Some(*teacher),
                })
                .await?;
            output::print_success(&message);
        }
    }

    output::print_rendered(&render::classes(app.selection(), format));
    Ok(())
}
