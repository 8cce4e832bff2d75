//! # Repository Traits
//!
//! Persistence seams. Production deployments back these with a database;
//! [`crate::memory::MemoryStore`] implements all of them in-process.
//!
//! Status writes go through [`InvoiceRepository::transition_from_pending`],
//! an atomic compare-and-set on `pending`. It is the transaction boundary for
//! confirmation and reconciliation: when two writers race on one invoice,
//! exactly one sees `Some(updated)`.

use crate::catalog::{Bookable, BookableRef, CatalogKind, Room, RoomType, Service};
use crate::error::BookingResult;
use crate::invoice::{Booking, Invoice, InvoiceStatus};
use crate::notification::Notification;
use crate::user::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: Uuid) -> BookingResult<Option<User>>;

    /// All accounts with the `super_admin` role
    async fn super_admins(&self) -> BookingResult<Vec<User>>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn insert_room_type(&self, room_type: RoomType) -> BookingResult<RoomType>;

    /// Fails with `NotFound` if the room type does not exist
    async fn insert_room(&self, room: Room) -> BookingResult<Room>;

    async fn insert_service(&self, service: Service) -> BookingResult<Service>;

    async fn room_types(&self, include_deleted: bool) -> BookingResult<Vec<RoomType>>;

    async fn rooms(&self, include_deleted: bool) -> BookingResult<Vec<Room>>;

    async fn services(&self, include_deleted: bool) -> BookingResult<Vec<Service>>;

    /// Resolve a reference, including soft-deleted entities
    async fn find_bookable(&self, reference: BookableRef) -> BookingResult<Option<Bookable>>;

    /// Set or clear `deleted_at`.
    ///
    /// Returns `Ok(false)` when the entity was already in the requested
    /// state and `NotFound` when it does not exist.
    async fn set_deleted(
        &self,
        kind: CatalogKind,
        id: Uuid,
        deleted_at: Option<DateTime<Utc>>,
    ) -> BookingResult<bool>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Store an invoice together with its bookings
    async fn insert_invoice(&self, invoice: &Invoice, bookings: &[Booking]) -> BookingResult<()>;

    async fn find_invoice(&self, id: Uuid) -> BookingResult<Option<Invoice>>;

    async fn bookings_for(&self, invoice_id: Uuid) -> BookingResult<Vec<Booking>>;

    /// Newest first
    async fn invoices_for_user(&self, user_id: Uuid) -> BookingResult<Vec<Invoice>>;

    /// Pending invoices created strictly before `cutoff`, oldest first
    async fn pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> BookingResult<Vec<Invoice>>;

    /// Move a pending invoice to `status`.
    ///
    /// Returns `Some(updated)` if the write happened and `None` if the
    /// invoice was no longer pending. `NotFound` if it does not exist.
    async fn transition_from_pending(
        &self,
        id: Uuid,
        status: InvoiceStatus,
        at: DateTime<Utc>,
    ) -> BookingResult<Option<Invoice>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert unless a notification with the same dedupe key exists.
    /// Returns whether a record was created.
    async fn insert_if_absent(&self, notification: Notification) -> BookingResult<bool>;

    /// Unread first, then newest first
    async fn notifications_for(&self, user_id: Uuid) -> BookingResult<Vec<Notification>>;

    /// Mark one of the user's notifications read; `NotFound` otherwise
    async fn mark_read(
        &self,
        user_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> BookingResult<Notification>;

    /// Delete read notifications created before `cutoff`
    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> BookingResult<usize>;
}

pub type SharedUsers = Arc<dyn UserRepository>;
pub type SharedCatalog = Arc<dyn CatalogRepository>;
pub type SharedInvoices = Arc<dyn InvoiceRepository>;
pub type SharedNotifications = Arc<dyn NotificationRepository>;
