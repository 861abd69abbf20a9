use base64::Engine;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::token::fields::{self, FieldError};

pub const CLIENT_API_URL_FIELD: &str = "clientApiUrl";
pub const AUTHORIZATION_FINGERPRINT_FIELD: &str = "authorizationFingerprint";
pub const VERSION_FIELD: &str = "version";

/// API coordinates extracted from a client token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfiguration {
    pub api_base_url: Url,
    pub authorization_fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid client token (unsupported format)")]
    UnsupportedFormat,
    #[error("invalid client token (unsupported version)")]
    UnsupportedVersion,
    #[error("invalid client token (missing {0})")]
    MissingField(&'static str),
    #[error("invalid client token (invalid {0})")]
    InvalidField(&'static str),
}

impl DecodeError {
    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::UnsupportedFormat => "unsupported_format",
            DecodeError::UnsupportedVersion => "unsupported_version",
            DecodeError::MissingField(_) => "missing_field",
            DecodeError::InvalidField(_) => "invalid_field",
        }
    }
}

/// Decode a base64 client token into the coordinates used for gateway requests.
///
/// The `version` value is required but not interpreted yet.
pub fn decode(token: &str) -> Result<ClientConfiguration, DecodeError> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(token.trim())
        .map_err(|_| DecodeError::UnsupportedFormat)?;

    let document: Value =
        serde_json::from_slice(&raw).map_err(|_| DecodeError::UnsupportedFormat)?;
    let map = fields::object(&document).map_err(|_| DecodeError::UnsupportedFormat)?;

    let version =
        fields::require_i64(map, VERSION_FIELD).map_err(|_| DecodeError::UnsupportedVersion)?;

    let api_base_url = fields::require_str(map, CLIENT_API_URL_FIELD)
        .map_err(|_: FieldError| DecodeError::MissingField(CLIENT_API_URL_FIELD))
        .and_then(|raw_url| {
            Url::parse(raw_url)
                .ok()
                .filter(|url| !url.cannot_be_a_base())
                .ok_or(DecodeError::InvalidField(CLIENT_API_URL_FIELD))
        })?;

    let authorization_fingerprint = fields::require_str(map, AUTHORIZATION_FINGERPRINT_FIELD)
        .map_err(|_| DecodeError::MissingField(AUTHORIZATION_FINGERPRINT_FIELD))?
        .to_owned();

    debug!(version, client_api_url = %api_base_url, "client token decoded");

    Ok(ClientConfiguration {
        api_base_url,
        authorization_fingerprint,
    })
}
