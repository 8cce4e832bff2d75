//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use stay_core::BookingError;
use thiserror::Error;
use tracing::error;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// Unknown `{kind}` segment in an admin path
    #[error("Unknown catalog kind: {0}")]
    UnknownKind(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::Booking(e) => e.status_code(),
            ApiError::UnknownKind(_) => 404,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ErrorResponse::new(self.to_string(), status.as_u16()))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let not_owner = ApiError::from(BookingError::NotOwner {
            invoice_id: Uuid::new_v4(),
        });
        assert_eq!(not_owner.status_code(), StatusCode::FORBIDDEN);

        let unpaid = ApiError::from(BookingError::PaymentNotCompleted {
            status: "requires_action".into(),
        });
        assert_eq!(unpaid.status_code(), StatusCode::PAYMENT_REQUIRED);

        let gateway = ApiError::from(BookingError::Network("timeout".into()));
        assert_eq!(gateway.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(
            ApiError::UnknownKind("suites".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
