//! Message and JSON output helpers shared by CLI commands and the shell.

use serde::Serialize;

use attendance_client::Notice;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Serialize a value as pretty JSON, falling back to `fallback` on failure
pub fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

/// Print a single serializable item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{:#?}", item),
        OutputFormat::Json => println!("{}", to_json(item, "{}")),
    }
}

/// Print a rendered view
pub fn print_rendered(rendered: &str) {
    println!("{}", rendered);
}

/// Print the outcome of one action
pub fn print_notice(notice: &Notice) {
    if notice.is_error {
        print_error(&notice.message);
    } else {
        print_success(&notice.message);
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}
