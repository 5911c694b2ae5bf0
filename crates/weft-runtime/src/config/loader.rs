//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables TOML configuration files (`weft.toml`)
//! - `yaml-config`: enables YAML configuration files (`weft.yaml`, `weft.yml`)
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Main config file (`weft.toml`)
//! 3. Mode-specific config file (`weft.{mode}.toml`), from the same directory
//! 4. Environment variables (`WEFT_*`)
//! 5. The application mode (`WEFT_ENV`, or [`ConfigLoader::mode`])
//! 6. Programmatic overrides
//!
//! A `mode` key in files or `WEFT_MODE` is ignored, so the reported mode is
//! always the one whose mode file was loaded.
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `WEFT_` prefix with `__` as separator:
//!
//! - `WEFT_DEBUG=true` → `debug = true`
//! - `WEFT_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `WEFT_ERRORS__NOT_FOUND__MESSAGE=Gone` → `errors.not_found.message = "Gone"`
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .mode("production")
//!     .file("./config/weft.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::AppConfig;

/// Environment variable naming the application mode.
pub const MODE_ENV: &str = "WEFT_ENV";

/// Returns the mode named by `WEFT_ENV`, or `develop`.
pub fn mode_from_env() -> String {
    std::env::var(MODE_ENV)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "develop".to_string())
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic overrides, merged last.
    overrides: Figment,
    /// Application mode.
    mode: String,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader for the mode named by `WEFT_ENV`.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            mode: mode_from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the application mode.
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges configuration programmatically, over every other source.
    pub fn merge(mut self, config: AppConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Sets a single value programmatically, such as `("debug", true)`.
    pub fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<AppConfig> {
        let figment = self.build_figment()?;

        let config: AppConfig = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(format!("Failed to extract configuration: {e}")))?;

        debug!(
            mode = %config.mode,
            debug = config.debug,
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if let Some(path) = self.config_file.take() {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, &path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with WEFT_ prefix");
            figment = figment.merge(Env::prefixed("WEFT_").ignore(&["env", "mode"]).split("__"));
        }

        // The mode picked the mode file above, so a `mode` key from a file
        // must not replace it.
        figment = figment.merge(Serialized::default("mode", &self.mode));

        Ok(figment.merge(self.overrides))
    }

    /// Merges `path` as a configuration file, choosing the format by extension.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        merge_format(figment, path, ext).map_err(|_| ConfigError::UnsupportedFormat(ext.to_string()))
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("weft"));
        }
        paths
    }

    /// Loads `weft.{ext}` and then `weft.{mode}.{ext}` from the first search
    /// path holding either.
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        for dir in self.resolve_search_paths() {
            let found: Vec<(PathBuf, &str)> = EXTENSIONS
                .iter()
                .flat_map(|ext| {
                    [
                        (dir.join(format!("weft.{ext}")), *ext),
                        (dir.join(format!("weft.{}.{ext}", self.mode)), *ext),
                    ]
                })
                .filter(|(path, _)| path.exists())
                .collect();
            if found.is_empty() {
                trace!(dir = %dir.display(), "No configuration file in search path");
                continue;
            }

            for (path, ext) in found {
                info!(path = %path.display(), "Loading configuration file");
                figment = merge_format(figment, &path, ext).unwrap_or_else(|unchanged| unchanged);
            }
            return figment;
        }

        debug!("No configuration file found, using defaults");
        figment
    }
}

/// File extensions searched for, in merge order.
const EXTENSIONS: &[&str] = &[
    #[cfg(feature = "toml-config")]
    "toml",
    #[cfg(feature = "yaml-config")]
    "yaml",
    #[cfg(feature = "yaml-config")]
    "yml",
];

/// Merges `path` in the format named by `ext`. Hands the figment back
/// unchanged if the format is not enabled.
fn merge_format(figment: Figment, path: &Path, ext: &str) -> Result<Figment, Figment> {
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => Err(figment),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<AppConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<AppConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
