//! # stay-core
//!
//! Core types and services for the stay-booking engine.
//!
//! This crate provides:
//! - `calculate` and `Rates` for month-plus-day stay pricing
//! - `RoomType`, `Room`, `Service` and the `Bookable` enum for the catalog
//! - `Invoice`, `Booking` and `InvoiceStatus` for billing records
//! - `PaymentGateway` trait for implementing payment providers
//! - `BillingService` for booking creation and payment confirmation
//! - `Reconciler` and the background jobs that settle stale invoices
//! - `NotificationDispatcher` / `QueuedSink` for "invoice paid" fan-out
//! - Repository traits plus the in-process `MemoryStore`
//! - `BookingError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use stay_core::{BillingService, BookableRef, BookingRequest, RequestContext};
//!
//! let request = BookingRequest {
//!     items: vec![BookableRef::room(room_id)],
//!     start_date: "2024-01-10".parse()?,
//!     end_date: "2024-02-15".parse()?,
//! };
//!
//! // Persist a pending invoice and open a payment intent
//! let receipt = billing.create_booking(&ctx, request).await?;
//!
//! // After the client completes payment with receipt.client_secret
//! let invoice = billing.confirm_payment(&ctx, receipt.invoice.id).await?;
//! ```

pub mod admin;
pub mod billing;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod inbox;
pub mod invoice;
pub mod jobs;
pub mod memory;
pub mod notification;
pub mod notify;
pub mod pricing;
pub mod reconcile;
pub mod repository;
pub mod user;

// Re-exports for convenience
pub use admin::{CatalogService, NewPriced, NewRoom};
pub use billing::{BillingService, BookingReceipt, BookingRequest, InvoiceDetails, Quote, QuoteLine};
pub use catalog::{
    Bookable, BookableKind, BookableRef, CatalogKind, CatalogSeed, Room, RoomType, Service,
};
pub use error::{BookingError, BookingResult};
pub use gateway::{BoxedPaymentGateway, IntentRequest, IntentStatus, PaymentGateway, PaymentIntent};
pub use inbox::Inbox;
pub use invoice::{Booking, Invoice, InvoicePaid, InvoiceStatus};
pub use jobs::{purge_read_notifications, spawn_reconciliation, spawn_retention, MIN_PERIOD};
pub use memory::MemoryStore;
pub use notification::{Notification, NotificationKind};
pub use notify::{NotificationDispatcher, PaidEventSink, QueuedSink, SharedSink};
pub use pricing::{calculate, split_stay, CostBreakdown, Currency, Price, Rates};
pub use reconcile::{ReconcileConfig, ReconcileReport, Reconciler};
pub use repository::{
    CatalogRepository, InvoiceRepository, NotificationRepository, SharedCatalog, SharedInvoices,
    SharedNotifications, SharedUsers, UserRepository,
};
pub use user::{RequestContext, Role, User, UserSeed};
