//! School attendance client
//!
//! Main entry point that loads the configuration, sets up logging and runs
//! the interactive shell.

use tracing_subscriber::{EnvFilter, fmt};

use attendance_cli::output::{self, OutputFormat};
use attendance_client::AttendanceApp;
use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Client error: {}", e);
        output::print_error(&e.user_message());
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<ClientConfig, AppError> {
    let config_path =
        std::env::var("ATTENDANCE_CONFIG").unwrap_or_else(|_| "config/default".to_string());

    let env = std::env::var("ATTENDANCE_ENV").unwrap_or_else(|_| "development".to_string());

    ClientConfig::load_from(&config_path, &env)
}

/// Initialize tracing/logging
///
/// Logs go to stderr so they do not interleave with the shell's prompts.
fn init_logging(config: &ClientConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Run the interactive client
async fn run(config: ClientConfig) -> Result<(), AppError> {
    tracing::info!(
        api = %config.api.base_url,
        storage = %config.storage.directory,
        "Starting school attendance client v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut app = AttendanceApp::from_config(&config)?;
    attendance_cli::shell::run(&mut app, OutputFormat::Table).await?;

    tracing::info!("Client stopped");
    Ok(())
}
