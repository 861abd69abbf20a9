use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::config::settings::ClientSettings;
use crate::gate::{PendingId, RequestGate};
use crate::gateway::GatewayClient;
use crate::observability::metrics::get_metrics;
use crate::service::provider::ClientTokenProvider;
use crate::service::request::TokenizationRequest;
use crate::service::response::TokenizationResponse;
use crate::token::{self, ClientConfiguration};
use crate::utils::constants::MSG_CONFIGURATION_UNAVAILABLE;

/// Exchanges raw payment details for payment method nonces.
///
/// Construction asks the provider for a client token once, in the background; calls to
/// [`tokenize`](Self::tokenize) wait until the decoded configuration is available. If the
/// provider yields nothing or the token cannot be decoded, the service never becomes ready
/// and `tokenize` waits forever unless a configuration timeout is set.
///
/// Constructors spawn onto the current Tokio runtime and fail outside of one.
pub struct TokenizationService {
    gate: Arc<RequestGate<ClientConfiguration>>,
    gateway: GatewayClient,
    configuration_timeout: Option<Duration>,
}

impl TokenizationService {
    pub fn new<P>(provider: P) -> Result<Self>
    where
        P: ClientTokenProvider + 'static,
    {
        Self::with_settings(provider, &ClientSettings::default())
    }

    pub fn with_settings<P>(provider: P, settings: &ClientSettings) -> Result<Self>
    where
        P: ClientTokenProvider + 'static,
    {
        let gateway = GatewayClient::from_settings(&settings.gateway)?;
        Self::with_gateway(provider, gateway, settings.configuration_timeout())
    }

    pub fn with_gateway<P>(provider: P, gateway: GatewayClient, configuration_timeout: Option<Duration>) -> Result<Self>
    where
        P: ClientTokenProvider + 'static,
    {
        let runtime = Handle::try_current().context("tokenization service must be created inside a Tokio runtime")?;
        let gate = Arc::new(RequestGate::new());
        runtime.spawn(bootstrap(provider, Arc::clone(&gate)));
        Ok(Self {
            gate,
            gateway,
            configuration_timeout,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    /// Tokenize calls currently waiting for the client configuration
    pub fn pending(&self) -> usize {
        self.gate.pending()
    }

    pub async fn tokenize(&self, request: &TokenizationRequest) -> TokenizationResponse {
        let response: TokenizationResponse = match self.configuration().await {
            Some(configuration) => {
                let parameters = request.parameters();
                self.gateway
                    .post(&configuration, request.path(), Some(&parameters))
                    .await
                    .into()
            }
            None => TokenizationResponse::gateway_error(MSG_CONFIGURATION_UNAVAILABLE),
        };

        get_metrics()
            .await
            .tokenizations
            .with_label_values(&[response.kind()])
            .inc();
        info!(result = response.kind(), "tokenization finished");
        response
    }

    /// Wait for the gate to release the configuration
    async fn configuration(&self) -> Option<ClientConfiguration> {
        let (tx, rx) = oneshot::channel();
        let _queued = QueuedWait {
            gate: &self.gate,
            id: self.gate.run_when_ready(move |configuration: &ClientConfiguration| {
                // receiver is gone when the caller gave up waiting
                let _ = tx.send(configuration.clone());
            }),
        };

        let Some(limit) = self.configuration_timeout else {
            return rx.await.ok();
        };
        match tokio::time::timeout(limit, rx).await {
            Ok(received) => received.ok(),
            Err(_) => {
                warn!(timeout_ms = limit.as_millis() as u64, "client configuration not ready in time");
                None
            }
        }
    }
}

/// Withdraws the queued operation of a `tokenize` call that stops waiting, whether it timed
/// out or its future was dropped.
struct QueuedWait<'a> {
    gate: &'a RequestGate<ClientConfiguration>,
    id: Option<PendingId>,
}

impl Drop for QueuedWait<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            self.gate.cancel(id);
        }
    }
}

async fn bootstrap<P>(provider: P, gate: Arc<RequestGate<ClientConfiguration>>)
where
    P: ClientTokenProvider,
{
    let metrics = get_metrics().await;

    let Some(client_token) = provider.client_token().await else {
        warn!("client token was not returned when requested by client token provider");
        metrics.client_token_failures.with_label_values(&["not_returned"]).inc();
        return;
    };

    match token::decode(&client_token) {
        Ok(configuration) => {
            info!(client_api_url = %configuration.api_base_url, "client configuration ready");
            gate.supply(configuration);
        }
        Err(e) => {
            error!("{}", e);
            metrics.client_token_failures.with_label_values(&[e.reason()]).inc();
        }
    }
}
