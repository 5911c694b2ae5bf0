//! Weft Runtime - the application layer of the Weft framework.
//!
//! This crate provides:
//! - The application orchestrator (`App`, `AppBuilder`)
//! - Layered configuration (`ConfigLoader`, `AppConfig`)
//! - Error pages for unmatched routes, failures and panics
//! - Automatic route resolution (`AutoRoute`)
//! - Logging configuration (`LoggingBuilder`)
//!
//! # Request Lifecycle
//!
//! ```text
//! run ─▶ middleware ─▶ [ stack entries matching the path ... ─▶ router ] ─▶ flush ─▶ end
//!                                   │ failure / panic
//!                                   └──▶ error page ─▶ error / crash
//! ```
//!
//! Each arrow on the top line is also an event on the application's
//! [`EventEmitter`](weft_core::EventEmitter).
//!
//! ```ignore
//! use weft_runtime::App;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = App::builder().config_file("weft.toml").build()?;
//!     app.route("/", |_, output, _| {
//!         output.write("index");
//!         Ok(())
//!     })?;
//!
//!     let output = app.run(Input::cli(std::env::args().skip(1)))?;
//!     println!("{}", output.body());
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolve;

// Re-exports
pub use app::{ALL_MODES, App, AppBuilder};
pub use config::{AppConfig, ConfigError, ConfigLoader, ConfigResult, ErrorPage, ErrorPages, LoggingConfig};
pub use error::{AppError, AppResult, ErrorKind};
pub use logging::{LoggingBuilder, SpanEvents};
pub use resolve::{AutoRoute, namespaced_identifier};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
