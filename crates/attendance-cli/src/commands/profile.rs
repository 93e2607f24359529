//! Self-service account commands.

use clap::{Args, Subcommand};

use attendance_client::Action;
use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;

use crate::{output, prompt};

/// Arguments for profile commands
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Profile subcommand
    #[command(subcommand)]
    pub command: ProfileCommand,
}

/// Profile subcommands
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Change your own login and/or password
    Credentials {
        /// New login
        #[arg(long)]
        login: Option<String>,
        /// New password (will prompt if neither option is given)
        #[arg(long)]
        password: Option<String>,
    },
}

/// Execute profile commands
pub async fn execute(args: &ProfileArgs, config: &ClientConfig) -> Result<(), AppError> {
    let mut app = super::open_session(config).await?;

    match &args.command {
        ProfileCommand::Credentials { login, password } => {
            let password = match (login, password) {
                (None, None) => prompt::optional_new_password("New password")?,
                _ => password.clone(),
            };
            let message = app
                .perform(Action::UpdateOwnCredentials {
                    login: login.clone(),
                    password,
                })
                .await?;
            output::print_success(&message);
        }
    }

    Ok(())
}
