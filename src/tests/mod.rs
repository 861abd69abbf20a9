pub mod common;
pub mod gateway_client;
pub mod tokenization_flow;
