//! CLI command definitions and dispatch.

pub mod attendance;
pub mod classes;
pub mod config;
pub mod profile;
pub mod session;
pub mod stats;
pub mod students;
pub mod users;

use clap::{Parser, Subcommand};

use attendance_client::AttendanceApp;
use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;
use attendance_core::types::{Class, ClassId};

use crate::output::OutputFormat;

/// School attendance client
#[derive(Debug, Parser)]
#[command(name = "attendance", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Configuration overlay to apply on top of the base file
    #[arg(short, long, env = "ATTENDANCE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login(session::LoginArgs),
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Whoami,
    /// Class management
    Classes(classes::ClassesArgs),
    /// Student roster management
    Students(students::StudentsArgs),
    /// Teacher account management (admin)
    Users(users::UsersArgs),
    /// Your own account
    Profile(profile::ProfileArgs),
    /// Daily attendance
    Attendance(attendance::AttendanceArgs),
    /// Weekly statistics
    Stats(stats::StatsArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Interactive session
    Shell,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        if let Commands::Config(args) = &self.command {
            return config::execute(args, &self.config, &self.env, self.format).await;
        }

        let config = load_config(&self.config, &self.env)?;
        match &self.command {
            Commands::Login(args) => session::login(args, &config, self.format).await,
            Commands::Logout => session::logout(&config).await,
            Commands::Whoami => session::whoami(&config, self.format).await,
            Commands::Classes(args) => classes::execute(args, &config, self.format).await,
            Commands::Students(args) => students::execute(args, &config, self.format).await,
            Commands::Users(args) => users::execute(args, &config, self.format).await,
            Commands::Profile(args) => profile::execute(args, &config).await,
            Commands::Attendance(args) => attendance::execute(args, &config, self.format).await,
            Commands::Stats(args) => stats::execute(args, &config, self.format).await,
            Commands::Shell => {
                let mut app = AttendanceApp::from_config(&config)?;
                crate::shell::run(&mut app, self.format).await
            }
            Commands::Config(_) => Ok(()),
        }
    }
}

/// Helper: load configuration for the given base file and overlay
pub fn load_config(config_path: &str, env: &str) -> Result<ClientConfig, AppError> {
    ClientConfig::load_from(config_path, env)
}

/// Helper: build a client and restore the stored session
///
/// Fails when nobody is logged in.
pub async fn open_session(config: &ClientConfig) -> Result<AttendanceApp, AppError> {
    let mut app = AttendanceApp::from_config(config)?;
    if !app.start().await? {
        return Err(AppError::precondition(
            "Not logged in. Run `attendance login` first",
        ));
    }
    Ok(app)
}

/// Helper: class a scoped command targets
///
/// An explicit `--class` wins. Otherwise the first loaded class, unless the
/// command spans every class.
pub fn target_class(
    explicit: Option<ClassId>,
    all_classes: bool,
    classes: &[Class],
) -> Option<ClassId> {
    if explicit.is_some() || all_classes {
        return explicit;
    }
    classes.first().map(|class| class.id)
}
