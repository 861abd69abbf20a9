use base64::Engine;
use httpmock::MockServer;
use serde_json::json;

use crate::gateway::GatewayClient;
use crate::service::{Expiration, TokenizationRequest};

pub const FINGERPRINT: &str = "fp-0123456789abcdef";
pub const CLIENT_API_PATH: &str = "/merchants/test_merchant/client_api";
pub const CREDIT_CARDS_MOCK_PATH: &str = "/merchants/test_merchant/client_api/v1/payment_methods/credit_cards";

/// Client token pointing at `client_api_url`
pub fn client_token(client_api_url: &str, fingerprint: &str) -> String {
    let document = json!({
        "version": 2,
        "clientApiUrl": client_api_url,
        "authorizationFingerprint": fingerprint,
        "configUrl": format!("{}/v1/configuration", client_api_url),
    });
    base64::engine::general_purpose::STANDARD.encode(document.to_string())
}

pub fn client_token_for(server: &MockServer) -> String {
    client_token(&server.url(CLIENT_API_PATH), FINGERPRINT)
}

pub fn test_visa() -> TokenizationRequest {
    TokenizationRequest::card("4111111111111111", Expiration::from_month_year(12, 2015))
}

pub fn gateway() -> GatewayClient {
    GatewayClient::builder()
        .request_timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("gateway client")
}
