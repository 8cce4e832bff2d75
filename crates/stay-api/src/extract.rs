//! Request context extraction.
//!
//! Callers identify themselves with an `x-user-id` header carrying their
//! user id; the id must resolve to a known account. The first language tag
//! of `accept-language` becomes the request locale.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use stay_core::{BookingError, RequestContext};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller of a request
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| BookingError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))?;

        let user_id = Uuid::parse_str(raw.trim())
            .map_err(|_| BookingError::Unauthorized(format!("malformed {} header", USER_ID_HEADER)))?;

        let user = state
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| BookingError::Unauthorized(format!("unknown user {}", user_id)))?;

        let mut ctx = RequestContext::new(user);
        if let Some(locale) = parts
            .headers
            .get(axum::http::header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(primary_locale)
        {
            ctx = ctx.with_locale(locale);
        }
        Ok(Caller(ctx))
    }
}

/// `"de-CH,de;q=0.9,en;q=0.8"` becomes `"de-CH"`
fn primary_locale(header: &str) -> Option<String> {
    let tag = header.split(',').next()?.split(';').next()?.trim();
    if tag.is_empty() || tag == "*" {
        None
    } else {
        Some(tag.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_locale() {
        assert_eq!(primary_locale("de-CH,de;q=0.9,en;q=0.8").as_deref(), Some("de-CH"));
        assert_eq!(primary_locale("fr;q=0.7").as_deref(), Some("fr"));
        assert_eq!(primary_locale("*"), None);
        assert_eq!(primary_locale(""), None);
    }
}
