//! # Payment Gateway Trait
//!
//! Seam between the billing service and the external payment provider.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PaymentGateway (trait)                    │
//! │  ├── create_intent()                                        │
//! │  ├── retrieve()                                             │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!          ┌───────┴───────┐   ┌───────┴───────┐
//!          │ StripeGateway │   │ test doubles  │
//!          └───────────────┘   └───────────────┘
//! ```

use crate::error::BookingResult;
use crate::pricing::Price;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Status of a payment intent as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    /// Passthrough for statuses this crate does not know
    Other(String),
}

impl IntentStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "requires_payment_method" => IntentStatus::RequiresPaymentMethod,
            "requires_confirmation" => IntentStatus::RequiresConfirmation,
            "requires_action" => IntentStatus::RequiresAction,
            "processing" => IntentStatus::Processing,
            "requires_capture" => IntentStatus::RequiresCapture,
            "canceled" => IntentStatus::Canceled,
            "succeeded" => IntentStatus::Succeeded,
            other => IntentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Other(s) => s.as_str(),
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, IntentStatus::Succeeded)
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IntentStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IntentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(IntentStatus::parse(&s))
    }
}

/// Request to open a payment attempt for an invoice
#[derive(Debug, Clone)]
pub struct IntentRequest {
    pub invoice_id: Uuid,
    pub amount: Price,

    /// Receipt email (optional)
    pub customer_email: Option<String>,

    /// Prevents duplicate intents on retries; defaults to the invoice id
    pub idempotency_key: String,

    pub metadata: HashMap<String, String>,
}

impl IntentRequest {
    pub fn new(invoice_id: Uuid, amount: Price) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("invoice_id".to_string(), invoice_id.to_string());
        Self {
            invoice_id,
            amount,
            customer_email: None,
            idempotency_key: invoice_id.to_string(),
            metadata,
        }
    }

    /// Set receipt email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A payment attempt held by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway id, stored on the invoice as its payment reference
    pub id: String,

    pub status: IntentStatus,

    /// Handle the client uses to complete the payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Price>,
}

/// Payment provider operations the billing lifecycle depends on.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment attempt and return its handle.
    async fn create_intent(&self, request: &IntentRequest) -> BookingResult<PaymentIntent>;

    /// Fetch the current state of a payment attempt.
    ///
    /// Network failures and timeouts surface as `BookingError::Network`;
    /// provider or decoding failures as `BookingError::Gateway`.
    async fn retrieve(&self, payment_reference: &str) -> BookingResult<PaymentIntent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
