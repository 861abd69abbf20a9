use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use http::{Method, StatusCode};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::config::settings::GatewaySettings;
use crate::gateway::encoding::encode_fingerprint;
use crate::gateway::trust::{self, PinnedRootsEvaluator, TrustEvaluator};
use crate::observability::metrics::get_metrics;
use crate::token::ClientConfiguration;
use crate::utils::constants::*;

/// Result of one gateway round trip
#[derive(Debug)]
pub enum GatewayOutcome {
    /// The gateway answered with a JSON object body
    Completed {
        body: Map<String, Value>,
        status: StatusCode,
    },
    /// The request never produced a response. The error carries no URL, since the query holds
    /// the authorization fingerprint.
    TransportError { error: reqwest::Error },
    /// Request could not be encoded, or the response could not be read as a JSON object
    UnexpectedError {
        description: String,
        cause: Option<anyhow::Error>,
        /// set when a response was received
        status: Option<StatusCode>,
    },
}

impl GatewayOutcome {
    fn unexpected(description: &str, cause: Option<anyhow::Error>, status: Option<StatusCode>) -> Self {
        GatewayOutcome::UnexpectedError {
            description: description.to_owned(),
            cause,
            status,
        }
    }

    fn transport(error: reqwest::Error) -> Self {
        GatewayOutcome::TransportError {
            error: error.without_url(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayOutcome::Completed { .. } => "completed",
            GatewayOutcome::TransportError { .. } => "transport_error",
            GatewayOutcome::UnexpectedError { .. } => "unexpected_error",
        }
    }
}

pub fn user_agent() -> String {
    format!("{}/{}/{}", USER_AGENT_PRODUCT, USER_AGENT_PLATFORM, VERSION)
}

#[derive(Default)]
pub struct GatewayClientBuilder {
    request_timeout: Option<Duration>,
    trust_evaluator: Option<Arc<dyn TrustEvaluator>>,
}

impl GatewayClientBuilder {
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn trust_evaluator(mut self, evaluator: Arc<dyn TrustEvaluator>) -> Self {
        self.trust_evaluator = Some(evaluator);
        self
    }

    pub fn build(self) -> Result<GatewayClient> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

        // no cookie store, no idle connections kept between requests
        let mut builder = Client::builder()
            .user_agent(user_agent())
            .default_headers(headers)
            .pool_max_idle_per_host(0);

        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(evaluator) = self.trust_evaluator {
            builder = builder.use_preconfigured_tls(trust::tls_config(evaluator)?);
        }

        let client = builder.build().context("cannot build gateway http client")?;
        Ok(GatewayClient { client })
    }
}

/// Sends authenticated requests to the client API named by a [`ClientConfiguration`].
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
}

impl GatewayClient {
    pub fn builder() -> GatewayClientBuilder {
        GatewayClientBuilder::default()
    }

    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn from_settings(settings: &GatewaySettings) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.request_timeout(timeout);
        }
        if !settings.pinned_certificates.is_empty() {
            let evaluator = PinnedRootsEvaluator::from_files(settings.pinned_certificates.as_slice())?;
            builder = builder.trust_evaluator(Arc::new(evaluator));
        }
        builder.build()
    }

    pub async fn post<B>(&self, config: &ClientConfiguration, path: &str, body: Option<&B>) -> GatewayOutcome
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, config, path, body).await
    }

    async fn request<B>(
        &self,
        method: Method,
        config: &ClientConfiguration,
        path: &str,
        body: Option<&B>,
    ) -> GatewayOutcome
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.client.request(method.clone(), request_url(config, path));

        if let Some(body) = body {
            match serde_json::to_vec(body) {
                Ok(bytes) => {
                    request = request.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(bytes);
                }
                Err(e) => {
                    return GatewayOutcome::unexpected(MSG_REQUEST_SERIALIZATION, Some(e.into()), None)
                }
            }
        }

        let metrics = get_metrics().await;
        metrics.gateway_requests.with_label_values(&[path]).inc();
        debug!(%method, path, "gateway request");

        let start = Instant::now();
        let outcome = match request.send().await {
            Err(error) => GatewayOutcome::transport(error),
            Ok(response) => read_response(response).await,
        };

        metrics
            .gateway_request_duration
            .with_label_values(&[path])
            .observe(start.elapsed().as_secs_f64());
        metrics.gateway_outcomes.with_label_values(&[outcome.kind()]).inc();
        outcome
    }
}

/// `base + "/" + path`, with the fingerprint as the only query parameter
pub(crate) fn request_url(config: &ClientConfiguration, path: &str) -> Url {
    let mut url = config.api_base_url.clone();
    let joined = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(Some(&format!(
        "{}={}",
        AUTHORIZATION_FINGERPRINT_PARAM,
        encode_fingerprint(&config.authorization_fingerprint)
    )));
    url
}

async fn read_response(response: reqwest::Response) -> GatewayOutcome {
    let status = response.status();
    let headers = response.headers();
    let broxy_id = headers
        .get(BROXY_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned();
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(JSON_MEDIA_TYPE));

    debug!(status = status.as_u16(), broxy_id = %broxy_id, "gateway response");

    match response.bytes().await {
        Ok(bytes) => parse_body(status, is_json, &bytes),
        Err(error) => GatewayOutcome::transport(error),
    }
}

fn parse_body(status: StatusCode, is_json: bool, bytes: &[u8]) -> GatewayOutcome {
    if !is_json || bytes.is_empty() {
        return GatewayOutcome::unexpected(MSG_INVALID_JSON_STRUCTURE, None, Some(status));
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(body)) => GatewayOutcome::Completed { body, status },
        Ok(_) => GatewayOutcome::unexpected(MSG_INVALID_JSON_STRUCTURE, None, Some(status)),
        Err(e) => GatewayOutcome::unexpected(MSG_INVALID_JSON, Some(e.into()), Some(status)),
    }
}
