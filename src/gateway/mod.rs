pub mod client;
pub mod encoding;
pub mod trust;

pub use client::{GatewayClient, GatewayClientBuilder, GatewayOutcome};
pub use trust::{PinnedRootsEvaluator, TrustError, TrustEvaluator};
