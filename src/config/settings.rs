use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// ================================
/// Client-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClientSettings {
    #[serde(default)]
    pub gateway: GatewaySettings,
    /// upper bound for `tokenize` waiting on the client token bootstrap.
    /// None → wait until configuration arrives, however long that takes
    pub configuration_timeout_ms: Option<u64>,
    pub logging: Option<LoggingConfig>,
}

impl ClientSettings {
    pub fn configuration_timeout(&self) -> Option<Duration> {
        self.configuration_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GatewaySettings {
    pub request_timeout_ms: Option<u64>,
    /// DER encoded root certificates; when non-empty only these anchors are trusted
    #[serde(default)]
    pub pinned_certificates: Vec<PathBuf>,
}

impl GatewaySettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}
