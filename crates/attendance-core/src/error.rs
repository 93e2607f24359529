//! Unified error types for the attendance client.
//!
//! Every component maps its failures into [`AppError`] so that a user action
//! can catch one error type at its boundary and turn it into a short notice.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No response reached the client (connection refused, DNS, timeout).
    Transport,
    /// The service answered with a non-success status.
    Remote,
    /// A scoped edit resolved to more than one class.
    AmbiguousScope,
    /// Local validation failed before any network call was made.
    Precondition,
    /// The persisted session record could not be read back.
    SessionCorrupt,
    /// The service answered 2xx with a body the client cannot accept.
    InvalidResponse,
    /// Durable client storage failed.
    Storage,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// Interactive input could not be read.
    Input,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "TRANSPORT"),
            Self::Remote => write!(f, "REMOTE"),
            Self::AmbiguousScope => write!(f, "AMBIGUOUS_SCOPE"),
            Self::Precondition => write!(f, "PRECONDITION"),
            Self::SessionCorrupt => write!(f, "SESSION_CORRUPT"),
            Self::InvalidResponse => write!(f, "INVALID_RESPONSE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Input => write!(f, "INPUT"),
        }
    }
}

/// The unified error used throughout the attendance client.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// HTTP status for [`ErrorKind::Remote`] errors.
    pub status: Option<u16>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a remote error carrying the HTTP status the service answered with.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorKind::Remote, message)
        }
    }

    /// Create an ambiguous-scope error.
    pub fn ambiguous_scope(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AmbiguousScope, message)
    }

    /// Create a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    /// Create a session-corrupt error.
    pub fn session_corrupt(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionCorrupt, message)
    }

    /// Create an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidResponse, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    /// Whether this error came back from the service with the given status.
    pub fn is_remote_status(&self, status: u16) -> bool {
        self.kind == ErrorKind::Remote && self.status == Some(status)
    }

    /// Short text suitable for a one-line user notice.
    ///
    /// Remote errors already carry the service's own message (or `HTTP <status>`),
    /// so only the message is shown for them.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::Remote | ErrorKind::Precondition | ErrorKind::AmbiguousScope => {
                self.message.clone()
            }
            ErrorKind::Transport => format!("Service unreachable: {}", self.message),
            _ => self.to_string(),
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            status: self.status,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let message = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let reason = errors
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field} {reason}")
            })
            .collect::<Vec<_>>()
            .join(", ");
        Self::with_source(ErrorKind::Precondition, message, err)
    }
}
