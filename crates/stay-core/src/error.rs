//! # Booking Error Types
//!
//! Typed error handling for the stay-booking engine.
//! All booking, billing and catalog operations return `Result<T, BookingError>`.

use crate::invoice::InvoiceStatus;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for all booking operations
#[derive(Debug, Error)]
pub enum BookingError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data (bad date range, mixed currencies, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// No caller identity attached to the request
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the role required for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invoice belongs to another user
    #[error("Invoice {invoice_id} does not belong to the caller")]
    NotOwner { invoice_id: Uuid },

    /// Invoice already left the pending state
    #[error("Invoice {invoice_id} is not pending (status: {status})")]
    InvoiceNotPending {
        invoice_id: Uuid,
        status: InvoiceStatus,
    },

    /// Gateway reports the payment has not succeeded yet
    #[error("Payment not completed (gateway status: {status})")]
    PaymentNotCompleted { status: String },

    /// Entity not found (or soft-deleted)
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Payment provider API error
    #[error("Gateway error [{provider}]: {message}")]
    Gateway { provider: String, message: String },

    /// Network/HTTP error communicating with the provider
    #[error("Network error: {0}")]
    Network(String),

    /// Storage write or read failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Shorthand for a not-found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        BookingError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true if a later attempt may succeed without caller changes
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BookingError::Network(_) | BookingError::Gateway { .. } | BookingError::Persistence(_)
        )
    }

    /// Returns true for errors caused by the payment provider
    pub fn is_gateway(&self) -> bool {
        matches!(self, BookingError::Network(_) | BookingError::Gateway { .. })
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            BookingError::Configuration(_) => 500,
            BookingError::Validation(_) => 422,
            BookingError::Unauthorized(_) => 401,
            BookingError::Forbidden(_) => 403,
            BookingError::NotOwner { .. } => 403,
            BookingError::InvoiceNotPending { .. } => 409,
            BookingError::PaymentNotCompleted { .. } => 402,
            BookingError::NotFound { .. } => 404,
            BookingError::Gateway { .. } => 502,
            BookingError::Network(_) => 503,
            BookingError::Persistence(_) => 500,
            BookingError::Serialization(_) => 500,
            BookingError::Internal(_) => 500,
        }
    }
}

/// Result type alias for booking operations
pub type BookingResult<T> = Result<T, BookingError>;
