//! Login, logout and session inspection commands.

use std::sync::Arc;

use clap::Args;

use attendance_client::session::SessionStore;
use attendance_client::{Action, AttendanceApp, FileStorage};
use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;

use crate::output::{self, OutputFormat};
use crate::{prompt, render};

/// Arguments for the login command
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Login (will prompt if not provided)
    #[arg(short, long)]
    pub login: Option<String>,
    /// Password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
    /// API base URL, e.g. http://localhost:8080/api/v1
    #[arg(long)]
    pub api_base: Option<String>,
}

/// Log in and store the session
pub async fn login(
    args: &LoginArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let login = match &args.login {
        Some(l) => l.clone(),
        None => prompt::text("Login")?,
    };
    let password = match &args.password {
        Some(p) => p.clone(),
        None => prompt::password("Password")?,
    };

    let mut app = AttendanceApp::from_config(config)?;
    let message = app
        .perform(Action::Login {
            api_base: args.api_base.clone(),
            login,
            password,
        })
        .await?;

    output::print_success(&message);
    output::print_rendered(&render::classes(app.selection(), format));
    Ok(())
}

/// Remove the stored session
pub async fn logout(config: &ClientConfig) -> Result<(), AppError> {
    let mut app = AttendanceApp::from_config(config)?;
    let message = app.perform(Action::Logout).await?;
    output::print_success(&message);
    Ok(())
}

/// Show the stored session without contacting the service
pub async fn whoami(config: &ClientConfig, format: OutputFormat) -> Result<(), AppError> {
    let storage = Arc::new(FileStorage::new(&config.storage.directory));
    let mut sessions = SessionStore::new(storage);

    match sessions.restore(&config.api.base_url).await {
        Some(session) => match format {
            OutputFormat::Json => output::print_item(
                &serde_json::json!({
                    "apiBase": session.api_base,
                    "role": session.role,
                    "userId": session.user_id,
                }),
                format,
            ),
            OutputFormat::Table => {
                output::print_kv("API base", &session.api_base);
                output::print_kv("Role", session.role.as_str());
                output::print_kv("User ID", &session.user_id.to_string());
            }
        },
        None => output::print_warning("Not logged in"),
    }
    Ok(())
}
