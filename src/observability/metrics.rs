use std::sync::Arc;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use tokio::sync::OnceCell;
use tracing::info;

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Lazily initializes and returns the process-wide metrics.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    /// scrape target for the host application
    pub registry: Registry,

    // Bootstrap metrics
    pub client_token_failures: IntCounterVec,

    // Gateway metrics
    pub gateway_requests: IntCounterVec,
    pub gateway_outcomes: IntCounterVec,
    pub gateway_request_duration: HistogramVec,

    // Tokenization metrics
    pub tokenizations: IntCounterVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("braintree".into()), None).unwrap();

        let metrics = Arc::new(Self {
            client_token_failures: IntCounterVec::new(Opts::new("client_token_failures_total", "Client token bootstrap failures by reason"), &["reason"]).unwrap(),

            gateway_requests: IntCounterVec::new(Opts::new("gateway_requests_total", "Gateway requests by path"), &["path"]).unwrap(),
            gateway_outcomes: IntCounterVec::new(Opts::new("gateway_outcomes_total", "Gateway outcomes by kind"), &["outcome"]).unwrap(),
            gateway_request_duration: HistogramVec::new(HistogramOpts::new("gateway_request_duration_seconds", "Gateway request duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["path"]).unwrap(),

            tokenizations: IntCounterVec::new(Opts::new("tokenizations_total", "Tokenization results"), &["result"]).unwrap(),

            registry,
        });

        let reg = &metrics.registry;
        reg.register(Box::new(metrics.client_token_failures.clone())).unwrap();
        reg.register(Box::new(metrics.gateway_requests.clone())).unwrap();
        reg.register(Box::new(metrics.gateway_outcomes.clone())).unwrap();
        reg.register(Box::new(metrics.gateway_request_duration.clone())).unwrap();
        reg.register(Box::new(metrics.tokenizations.clone())).unwrap();

        metrics
    }
}
