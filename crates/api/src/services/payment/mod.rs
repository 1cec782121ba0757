//! Stripe API client for payment intents.
//!
//! Checkout creates one payment intent per order; the browser confirms it
//! with the returned client secret and Stripe reports the result through the
//! webhook (see [`webhook`]).

pub mod webhook;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use shoe_store_core::{Currency, MoneyError, OrderId, to_minor_units};

use crate::config::StripeConfig;

/// Errors that can occur when interacting with Stripe.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response or event.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Amount cannot be charged.
    #[error("Invalid amount: {0}")]
    Amount(#[from] MoneyError),

    /// Webhook signature missing or wrong.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Client configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A created payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
    currency: Currency,
    webhook_secret: SecretString,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns error if the secret key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let mut auth_value =
            HeaderValue::from_str(&format!("Bearer {}", config.secret_key.expose_secret()))
                .map_err(|e| PaymentError::Config(format!("Invalid secret key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            currency: config.currency.clone(),
            webhook_secret: config.webhook_secret.clone(),
        })
    }

    /// The currency orders are charged in.
    #[must_use]
    pub const fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Create a payment intent for an order total.
    ///
    /// The amount is converted to the currency's minor unit, so `129.99 usd`
    /// is sent as `12999` and `1250000 vnd` as `1250000`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Amount` if the total cannot be charged, and
    /// `PaymentError::Http`/`Api`/`Parse` if the request fails.
    #[instrument(skip(self), fields(currency = %self.currency))]
    pub async fn create_payment_intent(
        &self,
        amount: Decimal,
        order_id: OrderId,
        description: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let amount_minor = to_minor_units(amount, &self.currency)?;
        let url = format!("{}/v1/payment_intents", self.api_base);

        let params = [
            ("amount", amount_minor.to_string()),
            ("currency", self.currency.as_str().to_owned()),
            ("description", description.to_owned()),
            ("metadata[OrderId]", order_id.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_owned()),
        ];

        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))?;

        tracing::info!(payment_intent_id = %intent.id, amount_minor, "Payment intent created");
        Ok(intent)
    }

    /// Verify a webhook payload against the configured endpoint secret.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` if verification fails.
    pub fn verify_webhook(&self, payload: &str, signature_header: &str) -> Result<(), PaymentError> {
        webhook::verify_signature(
            self.webhook_secret.expose_secret(),
            payload,
            signature_header,
            chrono::Utc::now().timestamp(),
        )
    }
}
