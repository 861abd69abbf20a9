#[cfg(test)]
mod test {

use std::collections::HashMap;

use http::StatusCode;
use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::{json, Value};
use url::Url;

use crate::gateway::GatewayOutcome;
use crate::tests::common::{gateway, CLIENT_API_PATH};
use crate::token::ClientConfiguration;
use crate::utils::constants::*;

fn configuration(server: &MockServer, fingerprint: &str) -> ClientConfiguration {
    ClientConfiguration {
        api_base_url: Url::parse(&server.url(CLIENT_API_PATH)).unwrap(),
        authorization_fingerprint: fingerprint.to_owned(),
    }
}

#[tokio::test]
async fn completed_outcome_carries_status_and_body() {
    let server = MockServer::start_async().await;
    let mock = server.mock_async(|when, then| {
        when.method(POST)
            .path(format!("{}/v1/echo", CLIENT_API_PATH))
            .query_param(AUTHORIZATION_FINGERPRINT_PARAM, "fp|merchant_id=abc&public_key=xyz")
            .json_body(json!({"ping": true}));
        then.status(202)
            .header("content-type", "application/json; charset=utf-8")
            .header(BROXY_ID_HEADER, "broxy-42")
            .json_body(json!({"pong": true}));
    }).await;

    let outcome = gateway()
        .post(&configuration(&server, "fp|merchant_id=abc&public_key=xyz"), "v1/echo", Some(&json!({"ping": true})))
        .await;

    match outcome {
        GatewayOutcome::Completed { body, status } => {
            assert_eq!(status, StatusCode::ACCEPTED);
            assert_eq!(body.get("pong"), Some(&Value::Bool(true)));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn bodyless_post_completes() {
    let server = MockServer::start_async().await;
    let mock = server.mock_async(|when, then| {
        when.method(POST).path(format!("{}/v1/empty", CLIENT_API_PATH));
        then.status(200).header("content-type", "application/json").json_body(json!({}));
    }).await;

    let outcome = gateway().post::<Value>(&configuration(&server, "fp"), "v1/empty", None).await;

    assert_eq!(outcome.kind(), "completed");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_json_response_is_invalid_structure() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST);
        then.status(200).header("content-type", "text/plain").body("ok");
    }).await;

    let outcome = gateway().post::<Value>(&configuration(&server, "fp"), "v1/anything", None).await;

    match outcome {
        GatewayOutcome::UnexpectedError { description, cause, status } => {
            assert_eq!(description, MSG_INVALID_JSON_STRUCTURE);
            assert!(cause.is_none());
            assert_eq!(status, Some(StatusCode::OK));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn unserializable_body_never_reaches_the_wire() {
    let server = MockServer::start_async().await;
    let mock = server.mock_async(|when, then| {
        when.method(POST);
        then.status(200);
    }).await;

    // JSON object keys must be strings
    let body: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
    let outcome = gateway().post(&configuration(&server, "fp"), "v1/anything", Some(&body)).await;

    match outcome {
        GatewayOutcome::UnexpectedError { description, cause, status } => {
            assert_eq!(description, MSG_REQUEST_SERIALIZATION);
            assert!(cause.is_some());
            assert!(status.is_none());
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let configuration = ClientConfiguration {
        api_base_url: Url::parse("http://127.0.0.1:1/client_api").unwrap(),
        authorization_fingerprint: "fp".into(),
    };

    let outcome = gateway().post::<Value>(&configuration, "v1/anything", None).await;

    let GatewayOutcome::TransportError { error } = outcome else {
        panic!("expected transport error, got {outcome:?}");
    };
    assert!(error.url().is_none());
    assert!(!error.to_string().contains("authorizationFingerprint"));
}

}
