use http::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::gateway::GatewayOutcome;
use crate::token::fields::{self, FieldError};
use crate::utils::constants::*;

/// Outcome of a tokenization, exactly one per `tokenize` call
#[derive(Debug, Clone, PartialEq)]
pub enum TokenizationResponse {
    /// Single-use reference to the payment details, safe to send to the merchant server
    PaymentMethodNonce { nonce: String },
    /// The gateway rejected the request content; `field_errors` is the full error body
    RequestError { message: String, field_errors: Value },
    /// Transport, format or gateway-side failure
    GatewayError { message: String },
}

impl TokenizationResponse {
    pub fn gateway_error(message: impl Into<String>) -> Self {
        TokenizationResponse::GatewayError {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TokenizationResponse::PaymentMethodNonce { .. } => "nonce",
            TokenizationResponse::RequestError { .. } => "request_error",
            TokenizationResponse::GatewayError { .. } => "gateway_error",
        }
    }

    pub fn nonce(&self) -> Option<&str> {
        match self {
            TokenizationResponse::PaymentMethodNonce { nonce } => Some(nonce.as_str()),
            _ => None,
        }
    }
}

impl From<GatewayOutcome> for TokenizationResponse {
    fn from(outcome: GatewayOutcome) -> Self {
        match outcome {
            GatewayOutcome::Completed { body, status } => from_completed(status, body),
            GatewayOutcome::TransportError { error } => {
                // the request URL carries the authorization fingerprint
                let error = error.without_url();
                warn!(error = %error, "gateway transport error");
                Self::gateway_error(error.to_string())
            }
            // a server failure wins over whatever its body looked like
            GatewayOutcome::UnexpectedError { status: Some(status), .. }
                if !status.is_success() && !status.is_client_error() =>
            {
                Self::gateway_error(MSG_SERVICE_ERROR)
            }
            GatewayOutcome::UnexpectedError { description, cause, .. } => {
                warn!(cause = ?cause, "{}", description);
                Self::gateway_error(description)
            }
        }
    }
}

fn from_completed(status: StatusCode, body: Map<String, Value>) -> TokenizationResponse {
    if status.is_client_error() {
        return match error_message(&body) {
            Ok(message) => TokenizationResponse::RequestError {
                message,
                field_errors: Value::Object(body),
            },
            Err(e) => {
                debug!(status = status.as_u16(), error = %e, "client error without message");
                TokenizationResponse::gateway_error(MSG_TOKENIZATION_REQUEST_ERROR)
            }
        };
    }
    if status.is_success() {
        return match first_nonce(&body) {
            Ok(nonce) => TokenizationResponse::PaymentMethodNonce { nonce },
            Err(e) => {
                debug!(status = status.as_u16(), error = %e, "success without nonce");
                TokenizationResponse::gateway_error(MSG_INVALID_RESPONSE_FORMAT)
            }
        };
    }
    TokenizationResponse::gateway_error(MSG_SERVICE_ERROR)
}

fn error_message(body: &Map<String, Value>) -> Result<String, FieldError> {
    fields::require_object(body, "error")
        .and_then(|error| fields::require_str(error, "message"))
        .map(str::to_owned)
}

fn first_nonce(body: &Map<String, Value>) -> Result<String, FieldError> {
    fields::require_array(body, "creditCards")
        .and_then(|cards| fields::first(cards, "creditCards"))
        .and_then(|card| fields::require_str(card, "nonce"))
        .map(str::to_owned)
}
