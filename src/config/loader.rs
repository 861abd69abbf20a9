use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{ClientSettings, LoggingConfig};
use crate::config::validator::validate_settings;

/// Load, expand and validate client settings from a YAML file
pub fn load_settings(path: &Path) -> Result<ClientSettings> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read settings '{}': {}", path.display(), e))?;
    parse_settings(&expand_env_vars(&content))
}

pub fn parse_settings(content: &str) -> Result<ClientSettings> {
    let mut settings: ClientSettings = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse settings error: {}", e))
        .map_err(|e| anyhow!("Invalid settings format: {}", e))?;

    // Apply defaults
    if settings.logging.is_none() {
        settings.logging = Some(LoggingConfig::default());
    }

    debug!("validating settings ...");
    validate_settings(&settings).map_err(|errors| anyhow!(errors.join("; ")))?;

    Ok(settings)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values
fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
