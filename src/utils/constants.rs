//! Shared constants and invariants

/// Library version reported in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USER_AGENT_PRODUCT: &str = "Braintree";
pub const USER_AGENT_PLATFORM: &str = "Rust";
pub const ACCEPT_LANGUAGE_VALUE: &str = "en_US";
pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

// Gateway paths
pub const CREDIT_CARDS_PATH: &str = "v1/payment_methods/credit_cards";

// Query and header names
pub const AUTHORIZATION_FINGERPRINT_PARAM: &str = "authorizationFingerprint";
pub const BROXY_ID_HEADER: &str = "X-BroxyId";

// Caller-facing gateway error messages
pub const MSG_TOKENIZATION_REQUEST_ERROR: &str = "Tokenization Request Error";
pub const MSG_INVALID_RESPONSE_FORMAT: &str = "Invalid Response Format";
pub const MSG_SERVICE_ERROR: &str = "Braintree Service Error";
pub const MSG_CONFIGURATION_UNAVAILABLE: &str = "Client configuration unavailable";

// Gateway outcome descriptions
pub const MSG_REQUEST_SERIALIZATION: &str = "Request JSON serialization error";
pub const MSG_INVALID_JSON: &str = "Invalid JSON in response";
pub const MSG_INVALID_JSON_STRUCTURE: &str = "Invalid JSON structure in response";
