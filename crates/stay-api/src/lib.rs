//! # stay-api
//!
//! HTTP API layer for stay-booking-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for the catalog, bookings, invoices and notifications
//! - `x-user-id` caller extraction into a `RequestContext`
//! - Configuration and seed loading for the `stay-booking` binary
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/room-types` | List active room types |
//! | GET | `/api/v1/rooms` | List active rooms |
//! | GET | `/api/v1/services` | List active services |
//! | POST | `/api/v1/admin/{room-types,rooms,services}` | Create catalog entry |
//! | DELETE | `/api/v1/admin/{kind}/{id}` | Soft delete |
//! | POST | `/api/v1/admin/{kind}/{id}/restore` | Restore |
//! | POST | `/api/v1/bookings/quote` | Price a booking |
//! | POST | `/api/v1/bookings` | Create booking + payment intent |
//! | GET | `/api/v1/invoices` | Caller's invoices |
//! | GET | `/api/v1/invoices/{id}` | Invoice with bookings |
//! | POST | `/api/v1/invoices/{id}/confirm` | Confirm payment |
//! | GET | `/api/v1/notifications` | Caller's notifications |
//! | POST | `/api/v1/notifications/{id}/read` | Mark read |

pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
