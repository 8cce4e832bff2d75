//! # Stripe PaymentIntents
//!
//! `PaymentGateway` implementation over the PaymentIntents REST API.
//! Invoices store the intent id as their payment reference; the client
//! completes the payment with the returned `client_secret`.

use crate::config::StripeConfig;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use stay_core::{
    BookingError, BookingResult, Currency, IntentRequest, IntentStatus, PaymentGateway,
    PaymentIntent, Price,
};
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe PaymentIntents gateway
pub struct StripeGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeGateway {
    /// Create a gateway; fails if the HTTP client cannot be built
    pub fn new(config: StripeConfig) -> BookingResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BookingError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> BookingResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    fn intents_url(&self) -> String {
        format!("{}/v1/payment_intents", self.config.api_base_url)
    }

    /// Form body for `POST /v1/payment_intents`
    fn form_params(request: &IntentRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("amount".to_string(), request.amount.amount.to_string()),
            ("currency".to_string(), request.amount.currency.as_str().to_string()),
            ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
        ];

        if let Some(ref email) = request.customer_email {
            params.push(("receipt_email".to_string(), email.clone()));
        }

        let mut metadata: Vec<_> = request.metadata.iter().collect();
        metadata.sort();
        for (key, value) in metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }
        params
    }

    /// Read the body and turn non-2xx responses into gateway errors
    async fn read_intent(response: Response) -> BookingResult<PaymentIntent> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BookingError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            let message = match serde_json::from_str::<StripeErrorResponse>(&body) {
                Ok(parsed) => parsed.error.describe(),
                Err(_) => format!("HTTP {}: {}", status, body),
            };
            return Err(BookingError::Gateway {
                provider: PROVIDER.to_string(),
                message,
            });
        }

        let intent: StripePaymentIntent = serde_json::from_str(&body).map_err(|e| {
            BookingError::Gateway {
                provider: PROVIDER.to_string(),
                message: format!("Failed to parse Stripe response: {}", e),
            }
        })?;
        Ok(intent.into())
    }
}

fn network_error(e: reqwest::Error) -> BookingError {
    if e.is_timeout() {
        BookingError::Network(format!("Stripe request timed out: {}", e))
    } else {
        BookingError::Network(e.to_string())
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(invoice_id = %request.invoice_id))]
    async fn create_intent(&self, request: &IntentRequest) -> BookingResult<PaymentIntent> {
        if request.amount.amount <= 0 {
            return Err(BookingError::Validation(
                "payment amount must be positive".to_string(),
            ));
        }

        debug!(
            "Creating Stripe payment intent: amount={}, currency={}",
            request.amount.amount, request.amount.currency
        );

        let response = self
            .client
            .post(self.intents_url())
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&Self::form_params(request))
            .send()
            .await
            .map_err(network_error)?;

        let intent = Self::read_intent(response).await?;
        info!(intent_id = %intent.id, status = %intent.status, "Created Stripe payment intent");
        Ok(intent)
    }

    #[instrument(skip(self))]
    async fn retrieve(&self, payment_reference: &str) -> BookingResult<PaymentIntent> {
        let response = self
            .client
            .get(format!("{}/{}", self.intents_url(), payment_reference))
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(network_error)?;

        let intent = Self::read_intent(response).await?;
        debug!(intent_id = %intent.id, status = %intent.status, "Retrieved Stripe payment intent");
        Ok(intent)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    status: IntentStatus,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
}

impl From<StripePaymentIntent> for PaymentIntent {
    fn from(raw: StripePaymentIntent) -> Self {
        let amount = match (raw.amount, raw.currency.as_deref().and_then(Currency::parse)) {
            (Some(amount), Some(currency)) => Some(Price::from_cents(amount, currency)),
            _ => None,
        };
        PaymentIntent {
            id: raw.id,
            status: raw.status,
            client_secret: raw.client_secret,
            amount,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl StripeError {
    fn describe(&self) -> String {
        match self.code {
            Some(ref code) => format!("{} ({})", self.message, code),
            None => self.message.clone(),
        }
    }
}
