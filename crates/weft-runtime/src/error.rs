//! Runtime error types.

use std::fmt;

use thiserror::Error;
use weft_framework::{FrameworkError, PatternError};

use crate::config::ConfigError;

/// Errors surfaced to the host by an application.
#[derive(Error, Debug)]
pub enum AppError {
    /// `run` was called while another run was in flight.
    #[error("Application already running")]
    AlreadyRunning,

    /// A handler failed while the application was in debug mode.
    #[error(transparent)]
    Handler(#[from] FrameworkError),

    /// A handler panicked while the application was in debug mode.
    #[error("Handler panicked: {0}")]
    Panicked(String),

    /// A route pattern did not compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// The built-in error pages an application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No route accepted the request.
    NotFound,
    /// A handler failed.
    Exception,
    /// A handler panicked.
    Crash,
}

impl ErrorKind {
    /// Returns the kind's name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Exception => "exception",
            Self::Crash => "crash",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
