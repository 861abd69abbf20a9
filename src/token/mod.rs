pub mod client_token;
pub mod fields;

pub use client_token::{decode, ClientConfiguration, DecodeError};
