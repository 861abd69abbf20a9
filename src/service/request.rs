use std::fmt;

use serde::Serialize;

use crate::utils::constants::CREDIT_CARDS_PATH;

/// A payment method's expiration date
#[derive(Clone, PartialEq, Eq)]
pub struct Expiration {
    expiration_date: String,
}

impl Expiration {
    /// Human-friendly date as typed by the customer: "MM/YY", "MM/YYYY" or "YYYY-MM"
    pub fn new(expiration_date: impl Into<String>) -> Self {
        Self {
            expiration_date: expiration_date.into(),
        }
    }

    /// `12, 2015` → `"12/2015"`, `3, 2020` → `"3/2020"`
    pub fn from_month_year(month: u32, year: u32) -> Self {
        Self::new(format!("{}/{}", month, year))
    }

    pub fn as_str(&self) -> &str {
        &self.expiration_date
    }
}

impl fmt::Debug for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expiration_date)
    }
}

/// Raw payment method details to exchange for a nonce
#[derive(Clone, PartialEq, Eq)]
pub enum TokenizationRequest {
    /// Credit or debit card; `number` should be Luhn-10 valid
    Card { number: String, expiration: Expiration },
}

/// Wire shape of a tokenization request body
#[derive(Debug, Serialize)]
pub enum RequestParameters<'a> {
    #[serde(rename = "credit_card")]
    CreditCard {
        number: &'a str,
        expiration_date: &'a str,
    },
}

impl TokenizationRequest {
    pub fn card(number: impl Into<String>, expiration: Expiration) -> Self {
        TokenizationRequest::Card {
            number: number.into(),
            expiration,
        }
    }

    /// Gateway path, relative to the client API base URL
    pub fn path(&self) -> &'static str {
        match self {
            TokenizationRequest::Card { .. } => CREDIT_CARDS_PATH,
        }
    }

    pub fn parameters(&self) -> RequestParameters<'_> {
        match self {
            TokenizationRequest::Card { number, expiration } => RequestParameters::CreditCard {
                number: number.as_str(),
                expiration_date: expiration.as_str(),
            },
        }
    }
}

// card numbers never reach logs in full
impl fmt::Debug for TokenizationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizationRequest::Card { number, expiration } => {
                let visible = number.len().saturating_sub(4);
                let last_four = number.get(visible..).unwrap_or("");
                f.debug_struct("Card")
                    .field("number", &format_args!("****{}", last_four))
                    .field("expiration", expiration)
                    .finish()
            }
        }
    }
}
