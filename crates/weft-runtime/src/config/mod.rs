//! Configuration for Weft applications.
//!
//! Settings are layered from defaults, TOML/YAML files and `WEFT_*`
//! environment variables, then validated before an application uses them.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, MODE_ENV, load_config, load_config_from_file, mode_from_env};
pub use schema::{
    AppConfig, ErrorPage, ErrorPages, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig,
};
pub use validation::validate_config;
