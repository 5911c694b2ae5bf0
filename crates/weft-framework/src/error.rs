//! Error types for the Weft framework.

use thiserror::Error;
use weft_core::InjectorError;

/// A boxed error from application code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A route pattern that could not be compiled.
#[derive(Debug, Clone, Error)]
#[error("invalid path pattern '{pattern}': {source}")]
pub struct PatternError {
    /// The pattern as registered.
    pub pattern: String,
    /// The underlying regex failure.
    #[source]
    pub source: regex::Error,
}

/// Failures that can occur while resolving or running handlers.
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// A route or middleware entry could not be resolved to an invokable.
    #[error("handler '{identifier}' can not be resolved")]
    InvalidHandler {
        /// The unresolved identifier.
        identifier: String,
    },

    /// A path pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The injector container was misused.
    #[error(transparent)]
    Injector(#[from] InjectorError),

    /// A handler failed with a message.
    #[error("{0}")]
    Handler(String),

    /// A handler failed with an arbitrary error.
    #[error(transparent)]
    Custom(BoxError),
}

impl FrameworkError {
    /// Creates an [`FrameworkError::InvalidHandler`].
    pub fn invalid_handler(identifier: impl Into<String>) -> Self {
        Self::InvalidHandler {
            identifier: identifier.into(),
        }
    }

    /// Creates a [`FrameworkError::Handler`] from a message.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// Wraps an arbitrary error.
    pub fn custom<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Custom(Box::new(error))
    }
}

/// Result type for pattern compilation.
pub type PatternResult<T> = Result<T, PatternError>;

/// Result type for framework operations.
pub type FrameworkResult<T> = Result<T, FrameworkError>;
