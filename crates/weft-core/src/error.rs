//! Unified error types for the Weft core.
//!
//! Framework-level errors (handler resolution, pattern compilation) are
//! defined in `weft-framework`.

use thiserror::Error;

// =============================================================================
// Injector Errors
// =============================================================================

/// Errors raised by the [`Injector`](crate::injector::Injector) container.
///
/// These are programmer errors: the dispatcher never catches them on its own,
/// they surface through the handler that misused the container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectorError {
    /// The key was never declared.
    #[error("can not get non-existent injector '{key}'")]
    UnknownKey {
        /// The missing key.
        key: String,
    },

    /// The key exists but its entry does not support the requested operation.
    #[error("injector '{key}' {reason}")]
    InvalidState {
        /// The offending key.
        key: String,
        /// Why the operation was rejected.
        reason: &'static str,
    },

    /// The resolved value is not of the requested type.
    #[error("injector '{key}' does not hold a value of type '{expected}'")]
    TypeMismatch {
        /// The key that was resolved.
        key: String,
        /// The requested type name.
        expected: &'static str,
    },

    /// A shared factory looked up its own entry while building it.
    #[error("shared injector was resolved again while it was being constructed")]
    SharedReentry,

    /// The key does not hold a protected callable.
    #[error("injector '{key}' is not a protected callable")]
    NotCallable {
        /// The key that was invoked.
        key: String,
    },
}

impl InjectorError {
    /// Creates an [`InjectorError::UnknownKey`].
    pub fn unknown(key: impl Into<String>) -> Self {
        Self::UnknownKey { key: key.into() }
    }

    /// Creates an [`InjectorError::InvalidState`].
    pub fn invalid_state(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidState {
            key: key.into(),
            reason,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for injector operations.
pub type InjectorResult<T> = Result<T, InjectorError>;

// =============================================================================
// Request Errors
// =============================================================================

/// A request method name that [`Method`](crate::io::Method) does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown method '{0}'")]
pub struct UnknownMethod(pub String);
