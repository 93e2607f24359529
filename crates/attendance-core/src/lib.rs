//! # attendance-core
//!
//! Core crate for the school attendance client. Contains the domain model
//! returned by the attendance service, typed identifiers, request bodies,
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
