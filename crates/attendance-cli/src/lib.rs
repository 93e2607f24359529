//! # attendance-cli
//!
//! Terminal front end for the school attendance client: one-shot commands
//! for scripting and an interactive shell.

pub mod commands;
pub mod output;
pub mod prompt;
pub mod render;
pub mod shell;

pub use commands::Cli;
