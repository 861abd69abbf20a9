use std::future::Future;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::token::fields;

pub const CLIENT_TOKEN_FIELD: &str = "client_token";

/// Obtains a fresh client token from the merchant's server.
///
/// Called once per [`TokenizationService`](crate::service::TokenizationService);
/// resolve to `None` when no token could be obtained.
pub trait ClientTokenProvider: Send + Sync {
    fn client_token(&self) -> impl Future<Output = Option<String>> + Send;
}

impl<F, Fut> ClientTokenProvider for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Option<String>> + Send,
{
    fn client_token(&self) -> impl Future<Output = Option<String>> + Send {
        self()
    }
}

/// Fetches `{"client_token": "..."}` with a GET to a merchant endpoint
#[derive(Debug, Clone)]
pub struct HttpClientTokenProvider {
    client: Client,
    url: Url,
}

impl HttpClientTokenProvider {
    pub fn new(url: Url) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    async fn fetch(&self) -> Result<String> {
        let response = self.client.get(self.url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("client token request failed: {}", response.status()));
        }
        let body: Value = response.json().await?;
        let token = fields::object(&body).and_then(|map| fields::require_str(map, CLIENT_TOKEN_FIELD))?;
        Ok(token.to_owned())
    }
}

impl ClientTokenProvider for HttpClientTokenProvider {
    async fn client_token(&self) -> Option<String> {
        debug!(url = %self.url, "requesting client token");
        self.fetch()
            .await
            .inspect_err(|e| warn!(url = %self.url, error = %e, "client token fetch failed"))
            .ok()
    }
}
