//! # Braintree Tokenizer
//!
//! Exchanges raw payment method details (card number, expiration date) for a
//! single-use payment method nonce by calling the gateway's client API.
//!
//! A [`TokenizationService`] asks a caller-supplied [`ClientTokenProvider`] for a
//! client token once, decodes it into API coordinates, and holds every
//! `tokenize` call until those coordinates are known.
//!
//! Modules:
//! - `token` — client token decoding and JSON field helpers
//! - `gate` — readiness gate that queues work until configuration arrives
//! - `gateway` — authenticated HTTP requests and TLS trust evaluation
//! - `service` — tokenization orchestration, providers, request/response types
//! - `config` — YAML settings
//! - `observability` — prometheus metrics

pub mod config;
pub mod gate;
pub mod gateway;
pub mod observability;
pub mod service;
pub mod token;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::config::settings::ClientSettings;
pub use crate::service::{
    ClientTokenProvider, Expiration, HttpClientTokenProvider, TokenizationRequest, TokenizationResponse,
    TokenizationService,
};
pub use crate::token::{ClientConfiguration, DecodeError};
