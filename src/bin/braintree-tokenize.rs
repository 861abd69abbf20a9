use std::path::PathBuf;

use anyhow::Result;
use braintree_tokenizer::config::loader::load_settings;
use braintree_tokenizer::utils::logging::{self, LogLevel};
use braintree_tokenizer::{
    ClientSettings, Expiration, HttpClientTokenProvider, TokenizationRequest, TokenizationResponse,
    TokenizationService,
};
use clap::Parser;
use tracing::{error, info};
use url::Url;

#[derive(Parser)]
#[command(author, version, about = "Tokenize a test card against a merchant's client token endpoint", long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// merchant endpoint answering `{"client_token": "..."}`
    #[arg(long, env = "CLIENT_TOKEN_URL", default_value = "https://braintree-sample-merchant.herokuapp.com/client_token")]
    client_token_url: Url,
    #[arg(long, default_value = "4111111111111111")]
    number: String,
    #[arg(long, default_value_t = 12)]
    expiration_month: u32,
    #[arg(long, default_value_t = 2015)]
    expiration_year: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load settings, start logging
    // -------------------------------

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => ClientSettings::default(),
    };
    logging::run(&settings, args.log_level);

    // -------------------------------
    // 2. Bootstrap the client from the merchant's token endpoint
    // -------------------------------

    info!("Initializing Braintree v{}", braintree_tokenizer::utils::constants::VERSION);
    let provider = HttpClientTokenProvider::new(args.client_token_url.clone());
    let service = TokenizationService::with_settings(provider, &settings)?;

    // -------------------------------
    // 3. Tokenize
    // -------------------------------

    let card = TokenizationRequest::card(
        args.number,
        Expiration::from_month_year(args.expiration_month, args.expiration_year),
    );
    info!(card = ?card, "tokenizing card");

    match service.tokenize(&card).await {
        TokenizationResponse::PaymentMethodNonce { nonce } => {
            info!("Got a nonce: {}", nonce);
            println!("{}", nonce);
        }
        TokenizationResponse::RequestError { message, field_errors } => {
            error!(field_errors = %field_errors, "Got a request error: {}", message);
        }
        TokenizationResponse::GatewayError { message } => {
            error!("Got a Braintree error: {}", message);
        }
    }
    Ok(())
}
