//! Convenience result type alias for the attendance client.

use crate::error::AppError;

/// A specialized `Result` type for attendance client operations.
pub type AppResult<T> = Result<T, AppError>;
