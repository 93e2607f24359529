//! Teacher account management CLI commands (admin only).

use clap::{Args, Subcommand};

use attendance_client::Action;
use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;
use attendance_core::types::{Role, UserId};

use crate::output::{self, OutputFormat};
use crate::{prompt, render};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UsersArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List all users
    List,
    /// Create a teacher account
    CreateTeacher {
        /// Login
        login: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Change a teacher's login and/or password
    Credentials {
        /// Teacher ID
        teacher: UserId,
        /// New login
        #[arg(long)]
        login: Option<String>,
        /// New password
        #[arg(long)]
        password: Option<String>,
    },
    /// Change a user's role
    Role {
        /// User ID
        user: UserId,
        /// New role (admin or teacher)
        role: Role,
    },
}

/// Execute user commands
pub async fn execute(
    args: &UsersArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut app = super::open_session(config).await?;
    if !app.admin_controls_visible() {
        return Err(AppError::precondition("Only administrators can manage users"));
    }

    let action = match &args.command {
        UserCommand::List => None,
        UserCommand::CreateTeacher { login, password } => {
            let password = match password {
                Some(p) => p.clone(),
                None => prompt::new_password("Teacher password")?,
            };
            Some(Action::CreateTeacher {
                login: login.clone(),
                password,
            })
        }
        UserCommand::Credentials {
            teacher,
            login,
            password,
        } => {
            let password = match (login, password) {
                (None, None) => prompt::optional_new_password("New password")?,
                _ => password.clone(),
            };
            Some(Action::UpdateCredentials {
                teacher_id: Some(*teacher),
                login: login.clone(),
                password,
            })
        }
        UserCommand::Role { user, role } => Some(Action::UpdateRole {
            user_id: *user,
            role: *role,
        }),
    };

    if let Some(action) = action {
        let message = app.perform(action).await?;
        output::print_success(&message);
    }

    output::print_rendered(&render::users(app.users(), format));
    Ok(())
}
