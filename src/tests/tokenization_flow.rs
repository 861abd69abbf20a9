// Drives TokenizationService end to end against a mock gateway:
//  - client token from a closure provider → decoded → gate released
//  - POST to the credit cards endpoint with fingerprint, headers and card body
//  - gateway status/body mapped to the typed response

#[cfg(test)]
mod test {

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;
use tokio::sync::Notify;

use crate::gateway::client::user_agent;
use crate::service::{TokenizationResponse, TokenizationService};
use crate::tests::common::{client_token, client_token_for, gateway, test_visa, CREDIT_CARDS_MOCK_PATH, FINGERPRINT};
use crate::utils::constants::*;

fn service_with_token(token: Option<String>) -> TokenizationService {
    TokenizationService::with_gateway(move || {
        let token = token.clone();
        async move { token }
    }, gateway(), None)
    .unwrap()
}

#[tokio::test]
async fn card_is_exchanged_for_nonce() {
    let server = MockServer::start_async().await;
    let mock = server.mock_async(|when, then| {
        when.method(POST)
            .path(CREDIT_CARDS_MOCK_PATH)
            .query_param(AUTHORIZATION_FINGERPRINT_PARAM, FINGERPRINT)
            .header("accept", "application/json")
            .header("accept-language", "en_US")
            .header("user-agent", user_agent())
            .header("content-type", "application/json; charset=utf-8")
            .json_body(json!({"credit_card": {"number": "4111111111111111", "expiration_date": "12/2015"}}));
        then.status(201)
            .header("content-type", "application/json")
            .json_body(json!({"creditCards": [{"nonce": "fake-nonce-123", "type": "CreditCard"}]}));
    }).await;

    let service = service_with_token(Some(client_token_for(&server)));
    let response = service.tokenize(&test_visa()).await;

    assert_eq!(response, TokenizationResponse::PaymentMethodNonce { nonce: "fake-nonce-123".into() });
    assert!(service.is_ready());
    mock.assert_async().await;
}

#[tokio::test]
async fn rejected_card_is_request_error_with_field_errors() {
    let server = MockServer::start_async().await;
    let body = json!({
        "error": {"message": "Invalid card"},
        "fieldErrors": [{"field": "creditCard", "fieldErrors": [{"field": "expirationDate", "message": "Expiration date is invalid"}]}]
    });
    let reply = body.clone();
    server.mock_async(move |when, then| {
        when.method(POST).path(CREDIT_CARDS_MOCK_PATH);
        then.status(422).header("content-type", "application/json").json_body(reply);
    }).await;

    let service = service_with_token(Some(client_token_for(&server)));

    assert_eq!(
        service.tokenize(&test_visa()).await,
        TokenizationResponse::RequestError { message: "Invalid card".into(), field_errors: body }
    );
}

#[tokio::test]
async fn unavailable_gateway_is_service_error() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(CREDIT_CARDS_MOCK_PATH);
        then.status(503).header("content-type", "text/html").body("<h1>maintenance</h1>");
    }).await;

    let service = service_with_token(Some(client_token_for(&server)));

    assert_eq!(service.tokenize(&test_visa()).await, TokenizationResponse::gateway_error(MSG_SERVICE_ERROR));
}

#[tokio::test]
async fn empty_card_list_is_invalid_format() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(CREDIT_CARDS_MOCK_PATH);
        then.status(200).header("content-type", "application/json").json_body(json!({"creditCards": []}));
    }).await;

    let service = service_with_token(Some(client_token_for(&server)));

    assert_eq!(service.tokenize(&test_visa()).await, TokenizationResponse::gateway_error(MSG_INVALID_RESPONSE_FORMAT));
}

#[tokio::test]
async fn garbled_success_body_is_invalid_json() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(CREDIT_CARDS_MOCK_PATH);
        then.status(201).header("content-type", "application/json").body("{\"creditCards\": [");
    }).await;

    let service = service_with_token(Some(client_token_for(&server)));

    assert_eq!(service.tokenize(&test_visa()).await, TokenizationResponse::gateway_error(MSG_INVALID_JSON));
}

#[tokio::test]
async fn unreachable_gateway_is_gateway_error() {
    // nothing listens on port 1
    let token = client_token("http://127.0.0.1:1/client_api", FINGERPRINT);
    let service = service_with_token(Some(token));

    match service.tokenize(&test_visa()).await {
        TokenizationResponse::GatewayError { message } => {
            assert!(!message.is_empty());
            assert!(!message.contains(FINGERPRINT), "fingerprint leaked: {message}");
            assert!(!message.contains("authorizationFingerprint"), "request URL leaked: {message}");
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_client_token_leaves_tokenize_pending() {
    let service = service_with_token(None);

    let waited = tokio::time::timeout(Duration::from_millis(300), service.tokenize(&test_visa())).await;

    assert!(waited.is_err(), "tokenize must not complete without configuration");
    assert!(!service.is_ready());
}

#[tokio::test]
async fn undecodable_client_token_leaves_tokenize_pending() {
    let service = service_with_token(Some("definitely not a client token".into()));

    let waited = tokio::time::timeout(Duration::from_millis(300), service.tokenize(&test_visa())).await;

    assert!(waited.is_err());
    assert!(!service.is_ready());
}

#[tokio::test]
async fn configuration_timeout_bounds_the_wait() {
    let service = TokenizationService::with_gateway(|| async { None::<String> }, gateway(), Some(Duration::from_millis(50))).unwrap();

    assert_eq!(
        service.tokenize(&test_visa()).await,
        TokenizationResponse::gateway_error(MSG_CONFIGURATION_UNAVAILABLE)
    );
}

#[tokio::test]
async fn timed_out_tokenizations_leave_nothing_queued() {
    let service = TokenizationService::with_gateway(|| async { None::<String> }, gateway(), Some(Duration::from_millis(5))).unwrap();

    for _ in 0..50 {
        assert_eq!(
            service.tokenize(&test_visa()).await,
            TokenizationResponse::gateway_error(MSG_CONFIGURATION_UNAVAILABLE)
        );
    }

    assert_eq!(service.pending(), 0);
}

#[tokio::test]
async fn abandoned_tokenization_is_withdrawn_from_queue() {
    let service = service_with_token(None);

    let waited = tokio::time::timeout(Duration::from_millis(50), service.tokenize(&test_visa())).await;

    assert!(waited.is_err());
    assert_eq!(service.pending(), 0);
}

#[test]
fn construction_outside_runtime_is_an_error() {
    let built = TokenizationService::with_gateway(|| async { None::<String> }, gateway(), None);

    assert!(built.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn queued_tokenizations_are_released_once_token_arrives() {
    let server = MockServer::start_async().await;
    let mock = server.mock_async(|when, then| {
        when.method(POST).path(CREDIT_CARDS_MOCK_PATH);
        then.status(201).header("content-type", "application/json").json_body(json!({"creditCards": [{"nonce": "queued-nonce"}]}));
    }).await;

    let release = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let token = client_token_for(&server);
    let provider = {
        let release = Arc::clone(&release);
        let calls = Arc::clone(&calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let release = Arc::clone(&release);
            let token = token.clone();
            async move {
                release.notified().await;
                Some(token)
            }
        }
    };
    let service = Arc::new(TokenizationService::with_gateway(provider, gateway(), None).unwrap());

    let pending: Vec<_> = (0..2)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.tokenize(&test_visa()).await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!service.is_ready());
    assert_eq!(service.pending(), 2);
    assert!(pending.iter().all(|task| !task.is_finished()));

    release.notify_one();
    for task in pending {
        assert_eq!(task.await.unwrap().nonce(), Some("queued-nonce"));
    }

    // later calls skip the queue and the provider is never asked again
    assert_eq!(service.tokenize(&test_visa()).await.nonce(), Some("queued-nonce"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    mock.assert_calls_async(3).await;
}

}
