//! # stay-stripe
//!
//! Stripe payment gateway for stay-booking-rs.
//!
//! `StripeGateway` implements `stay_core::PaymentGateway` over the
//! PaymentIntents API:
//! - `create_intent` opens an intent per invoice, keyed by the invoice id
//!   so retries never double-charge
//! - `retrieve` reads the intent status for confirmation and reconciliation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stay_stripe::StripeGateway;
//! use stay_core::{IntentRequest, PaymentGateway};
//!
//! // Create gateway from environment
//! let gateway = StripeGateway::from_env()?;
//!
//! let intent = gateway
//!     .create_intent(&IntentRequest::new(invoice.id, invoice.total_cost))
//!     .await?;
//!
//! // Hand intent.client_secret to the client, store intent.id on the invoice
//! ```

pub mod config;
pub mod intents;

// Re-exports
pub use config::StripeConfig;
pub use intents::StripeGateway;
