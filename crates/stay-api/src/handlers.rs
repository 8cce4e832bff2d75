//! # Request Handlers
//!
//! Axum request handlers for the booking API.
//! Every handler that acts on behalf of a user takes a [`Caller`].

use crate::error::{ApiError, ApiResult};
use crate::extract::Caller;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use stay_core::{
    BookingReceipt, BookingRequest, CatalogKind, Invoice, InvoiceDetails, NewPriced, NewRoom,
    Notification, Quote, Room, RoomType, Service,
};
use tracing::info;
use uuid::Uuid;

fn catalog_kind(segment: &str) -> ApiResult<CatalogKind> {
    CatalogKind::from_path(segment).ok_or_else(|| ApiError::UnknownKind(segment.to_string()))
}

// =============================================================================
// Health
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "stay-booking",
        "version": env!("CARGO_PKG_VERSION"),
        "payment_provider": state.provider,
    }))
}

// =============================================================================
// Catalog
// =============================================================================

pub async fn list_room_types(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let room_types = state.catalog.room_types().await?;
    Ok(Json(json!({
        "room_types": room_types,
        "count": room_types.len()
    })))
}

pub async fn list_rooms(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let rooms = state.catalog.rooms().await?;
    Ok(Json(json!({
        "rooms": rooms,
        "count": rooms.len()
    })))
}

pub async fn list_services(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let services = state.catalog.services().await?;
    Ok(Json(json!({
        "services": services,
        "count": services.len()
    })))
}

pub async fn create_room_type(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(input): Json<NewPriced>,
) -> ApiResult<(StatusCode, Json<RoomType>)> {
    let room_type = state.catalog.create_room_type(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(room_type)))
}

pub async fn create_room(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(input): Json<NewRoom>,
) -> ApiResult<(StatusCode, Json<Room>)> {
    let room = state.catalog.create_room(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn create_service(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(input): Json<NewPriced>,
) -> ApiResult<(StatusCode, Json<Service>)> {
    let service = state.catalog.create_service(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// Soft delete a catalog entry
pub async fn delete_entry(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path((kind, id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    state.catalog.delete(&ctx, catalog_kind(&kind)?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore a soft-deleted catalog entry
pub async fn restore_entry(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path((kind, id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    state.catalog.restore(&ctx, catalog_kind(&kind)?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Bookings & invoices
// =============================================================================

/// Price a booking without persisting it
pub async fn quote_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> ApiResult<Json<Quote>> {
    Ok(Json(state.billing.quote(&request).await?))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(request): Json<BookingRequest>,
) -> ApiResult<(StatusCode, Json<BookingReceipt>)> {
    let receipt = state.billing.create_booking(&ctx, request).await?;
    info!(invoice_id = %receipt.invoice.id, "Booking accepted");
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> ApiResult<impl IntoResponse> {
    let invoices = state.billing.invoices(&ctx).await?;
    Ok(Json(json!({
        "invoices": invoices,
        "count": invoices.len()
    })))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(invoice_id): Path<Uuid>,
) -> ApiResult<Json<InvoiceDetails>> {
    Ok(Json(state.billing.invoice_details(&ctx, invoice_id).await?))
}

/// Confirm a client-side payment
pub async fn confirm_invoice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(invoice_id): Path<Uuid>,
) -> ApiResult<Json<Invoice>> {
    Ok(Json(state.billing.confirm_payment(&ctx, invoice_id).await?))
}

// =============================================================================
// Notifications
// =============================================================================

pub async fn list_notifications(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> ApiResult<impl IntoResponse> {
    let notifications = state.inbox.list(&ctx).await?;
    let unread = notifications.iter().filter(|n| !n.is_read()).count();
    Ok(Json(json!({
        "notifications": notifications,
        "count": notifications.len(),
        "unread": unread
    })))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<Json<Notification>> {
    Ok(Json(state.inbox.mark_read(&ctx, notification_id).await?))
}
