//! School attendance CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use attendance_cli::{Cli, output};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        output::print_error(&e.user_message());
        std::process::exit(1);
    }
}
