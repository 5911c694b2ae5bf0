//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application mode, such as `develop` or `production`.
    pub mode: String,

    /// Debug mode. Handler failures propagate to the caller instead of being
    /// rendered as error pages.
    pub debug: bool,

    /// Convert handler panics into the crash page (ignored in debug mode).
    pub catch_panics: bool,

    /// Charset appended to the `Content-Type` header.
    pub charset: String,

    /// Built-in error pages.
    pub errors: ErrorPages,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            debug: false,
            catch_panics: true,
            charset: "UTF-8".to_string(),
            errors: ErrorPages::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_mode() -> String {
    "develop".to_string()
}

// =============================================================================
// Error pages
// =============================================================================

/// Status and message of one built-in error page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPage {
    /// Response status.
    pub status: u16,
    /// Response body.
    pub message: String,
}

impl ErrorPage {
    /// Creates an error page.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// The three built-in error pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorPages {
    /// Shown when no route accepts the request.
    pub not_found: ErrorPage,
    /// Shown when a handler fails.
    pub exception: ErrorPage,
    /// Shown when a handler panics.
    pub crash: ErrorPage,
}

impl Default for ErrorPages {
    fn default() -> Self {
        Self {
            not_found: ErrorPage::new(404, "Location not found"),
            exception: ErrorPage::new(500, "Error occurred"),
            crash: ErrorPage::new(500, "Application crash"),
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level.
    pub level: LogLevel,

    /// Line format.
    pub format: LogFormat,

    /// Destination.
    pub output: LogOutput,

    /// Target file when `output` is `file`.
    pub file_path: Option<PathBuf>,

    /// Per-module level overrides, such as `weft_framework = "trace"`.
    pub filters: HashMap<String, LogLevel>,

    /// Span lifecycle events.
    pub span_events: SpanEventConfig,

    /// Include thread IDs.
    pub thread_ids: bool,

    /// Include file and line.
    pub file_location: bool,
}
