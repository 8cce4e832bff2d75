//! # Routes
//!
//! Axum router configuration for the booking API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes (under `/api/v1`):
/// - Catalog (public):
///   - GET  /room-types, /rooms, /services
/// - Catalog admin (admin, super_admin):
///   - POST   /admin/room-types, /admin/rooms, /admin/services
///   - DELETE /admin/{kind}/{id}
///   - POST   /admin/{kind}/{id}/restore
/// - Bookings:
///   - POST /bookings/quote - Price without persisting
///   - POST /bookings - Create invoice, bookings and payment intent
/// - Invoices:
///   - GET  /invoices, /invoices/{id}
///   - POST /invoices/{id}/confirm - Confirm a client-side payment
/// - Notifications:
///   - GET  /notifications
///   - POST /notifications/{id}/read
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog_routes = Router::new()
        .route("/room-types", get(handlers::list_room_types))
        .route("/rooms", get(handlers::list_rooms))
        .route("/services", get(handlers::list_services));

    let admin_routes = Router::new()
        .route("/room-types", post(handlers::create_room_type))
        .route("/rooms", post(handlers::create_room))
        .route("/services", post(handlers::create_service))
        .route("/{kind}/{id}", delete(handlers::delete_entry))
        .route("/{kind}/{id}/restore", post(handlers::restore_entry));

    let billing_routes = Router::new()
        .route("/bookings/quote", post(handlers::quote_booking))
        .route("/bookings", post(handlers::create_booking))
        .route("/invoices", get(handlers::list_invoices))
        .route("/invoices/{invoice_id}", get(handlers::get_invoice))
        .route("/invoices/{invoice_id}/confirm", post(handlers::confirm_invoice));

    let notification_routes = Router::new()
        .route("/notifications", get(handlers::list_notifications))
        .route(
            "/notifications/{notification_id}/read",
            post(handlers::mark_notification_read),
        );

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(catalog_routes)
        .nest("/admin", admin_routes)
        .merge(billing_routes)
        .merge(notification_routes);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
