//! Settings validation with aggregated errors.

use tracing::error;

use crate::config::settings::{ClientSettings, LoggingConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_settings(settings: &ClientSettings) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    if settings.configuration_timeout_ms == Some(0) {
        errors.push("settings.configuration_timeout_ms must be greater than 0".to_string());
    }
    if settings.gateway.request_timeout_ms == Some(0) {
        errors.push("settings.gateway.request_timeout_ms must be greater than 0".to_string());
    }
    for path in &settings.gateway.pinned_certificates {
        if !path.is_file() {
            errors.push(format!(
                "settings.gateway.pinned_certificates: '{}' is not a readable file",
                path.display()
            ));
        }
    }
    if let Some(logging) = &settings.logging {
        validate_logging(logging, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        for e in &errors {
            error!("settings validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        errors.push(format!(
            "settings.logging.level '{}' must be one of {:?}",
            logging.level, LOG_LEVELS
        ));
    }
}
