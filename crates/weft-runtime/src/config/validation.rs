//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{AppConfig, ErrorPage, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &AppConfig) -> ConfigResult<()> {
    if config.mode.trim().is_empty() {
        return Err(ConfigError::validation("Mode must not be empty"));
    }

    if config.charset.trim().is_empty() {
        return Err(ConfigError::validation("Charset must not be empty"));
    }

    validate_error_page("not_found", &config.errors.not_found)?;
    validate_error_page("exception", &config.errors.exception)?;
    validate_error_page("crash", &config.errors.crash)?;
    validate_logging(&config.logging)?;

    Ok(())
}

/// Error pages must carry a client or server error status.
fn validate_error_page(name: &str, page: &ErrorPage) -> ConfigResult<()> {
    if !(400..600).contains(&page.status) {
        return Err(ConfigError::validation(format!(
            "Error page '{name}' has status {}, expected 400-599",
            page.status
        )));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "File log output requires logging.file_path",
        ));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid logging filter module: '{module}'"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_error_status() {
        let mut config = AppConfig::default();
        config.errors.crash.status = 200;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_empty_mode() {
        let config = AppConfig {
            mode: " ".to_string(),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = AppConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("weft.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
