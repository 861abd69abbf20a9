pub mod provider;
pub mod request;
pub mod response;
pub mod tokenization;

pub use provider::{ClientTokenProvider, HttpClientTokenProvider};
pub use request::{Expiration, TokenizationRequest};
pub use response::TokenizationResponse;
pub use tokenization::TokenizationService;
