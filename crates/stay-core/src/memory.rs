//! # In-Memory Store
//!
//! Implements every repository trait behind `tokio::sync::RwLock`s.
//! Used by the API server and by tests.

use crate::catalog::{
    Bookable, BookableKind, BookableRef, CatalogKind, CatalogSeed, Room, RoomType, Service,
};
use crate::error::{BookingError, BookingResult};
use crate::invoice::{Booking, Invoice, InvoiceStatus};
use crate::notification::{Notification, NotificationKind};
use crate::repository::{
    CatalogRepository, InvoiceRepository, NotificationRepository, UserRepository,
};
use crate::user::{Role, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct CatalogTables {
    room_types: HashMap<Uuid, RoomType>,
    rooms: HashMap<Uuid, Room>,
    services: HashMap<Uuid, Service>,
}

#[derive(Default)]
struct InvoiceTables {
    invoices: HashMap<Uuid, Invoice>,
    bookings: HashMap<Uuid, Vec<Booking>>,
}

#[derive(Default)]
struct NotificationTable {
    rows: HashMap<Uuid, Notification>,
    keys: HashSet<(Uuid, NotificationKind, Option<Uuid>)>,
}

/// Process-local storage for users, catalog, invoices and notifications
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    catalog: RwLock<CatalogTables>,
    invoices: RwLock<InvoiceTables>,
    notifications: RwLock<NotificationTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Load catalog entries; rooms referencing unknown room types are rejected
    pub async fn load_catalog(&self, seed: CatalogSeed) -> BookingResult<()> {
        for room_type in seed.room_types {
            room_type.rates.validate()?;
            self.insert_room_type(room_type).await?;
        }
        for room in seed.rooms {
            self.insert_room(room).await?;
        }
        for service in seed.services {
            service.rates.validate()?;
            self.insert_service(service).await?;
        }
        Ok(())
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: Uuid) -> BookingResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn super_admins(&self) -> BookingResult<Vec<User>> {
        let users = self.users.read().await;
        let admins: Vec<User> = users
            .values()
            .filter(|u| u.role == Role::SuperAdmin)
            .cloned()
            .collect();
        Ok(sorted_by(admins, |u: &User| u.email.clone()))
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn insert_room_type(&self, room_type: RoomType) -> BookingResult<RoomType> {
        let mut catalog = self.catalog.write().await;
        catalog.room_types.insert(room_type.id, room_type.clone());
        Ok(room_type)
    }

    async fn insert_room(&self, room: Room) -> BookingResult<Room> {
        let mut catalog = self.catalog.write().await;
        if !catalog.room_types.contains_key(&room.room_type_id) {
            return Err(BookingError::not_found("Room type", room.room_type_id));
        }
        catalog.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    async fn insert_service(&self, service: Service) -> BookingResult<Service> {
        let mut catalog = self.catalog.write().await;
        catalog.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn room_types(&self, include_deleted: bool) -> BookingResult<Vec<RoomType>> {
        let catalog = self.catalog.read().await;
        let items: Vec<RoomType> = catalog
            .room_types
            .values()
            .filter(|t| include_deleted || t.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(sorted_by(items, |t: &RoomType| t.name.clone()))
    }

    async fn rooms(&self, include_deleted: bool) -> BookingResult<Vec<Room>> {
        let catalog = self.catalog.read().await;
        let items: Vec<Room> = catalog
            .rooms
            .values()
            .filter(|r| include_deleted || r.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(sorted_by(items, |r: &Room| r.number.clone()))
    }

    async fn services(&self, include_deleted: bool) -> BookingResult<Vec<Service>> {
        let catalog = self.catalog.read().await;
        let items: Vec<Service> = catalog
            .services
            .values()
            .filter(|s| include_deleted || s.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(sorted_by(items, |s: &Service| s.name.clone()))
    }

    async fn find_bookable(&self, reference: BookableRef) -> BookingResult<Option<Bookable>> {
        let catalog = self.catalog.read().await;
        let bookable = match reference.kind {
            BookableKind::Room => catalog.rooms.get(&reference.id).and_then(|room| {
                catalog
                    .room_types
                    .get(&room.room_type_id)
                    .map(|room_type| Bookable::Room {
                        room: room.clone(),
                        room_type: room_type.clone(),
                    })
            }),
            BookableKind::Service => catalog
                .services
                .get(&reference.id)
                .cloned()
                .map(Bookable::Service),
        };
        Ok(bookable)
    }

    async fn set_deleted(
        &self,
        kind: CatalogKind,
        id: Uuid,
        deleted_at: Option<DateTime<Utc>>,
    ) -> BookingResult<bool> {
        let mut catalog = self.catalog.write().await;
        let slot = match kind {
            CatalogKind::RoomType => catalog.room_types.get_mut(&id).map(|t| &mut t.deleted_at),
            CatalogKind::Room => catalog.rooms.get_mut(&id).map(|r| &mut r.deleted_at),
            CatalogKind::Service => catalog.services.get_mut(&id).map(|s| &mut s.deleted_at),
        }
        .ok_or_else(|| BookingError::not_found(kind.label(), id))?;

        if slot.is_some() == deleted_at.is_some() {
            return Ok(false);
        }
        *slot = deleted_at;
        Ok(true)
    }
}

#[async_trait]
impl InvoiceRepository for MemoryStore {
    async fn insert_invoice(&self, invoice: &Invoice, bookings: &[Booking]) -> BookingResult<()> {
        let mut tables = self.invoices.write().await;
        if tables.invoices.contains_key(&invoice.id) {
            return Err(BookingError::Persistence(format!(
                "invoice {} already exists",
                invoice.id
            )));
        }
        tables.invoices.insert(invoice.id, invoice.clone());
        tables.bookings.insert(invoice.id, bookings.to_vec());
        Ok(())
    }

    async fn find_invoice(&self, id: Uuid) -> BookingResult<Option<Invoice>> {
        Ok(self.invoices.read().await.invoices.get(&id).cloned())
    }

    async fn bookings_for(&self, invoice_id: Uuid) -> BookingResult<Vec<Booking>> {
        Ok(self
            .invoices
            .read()
            .await
            .bookings
            .get(&invoice_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn invoices_for_user(&self, user_id: Uuid) -> BookingResult<Vec<Invoice>> {
        let tables = self.invoices.read().await;
        let mut items: Vec<Invoice> = tables
            .invoices
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> BookingResult<Vec<Invoice>> {
        let tables = self.invoices.read().await;
        let mut items: Vec<Invoice> = tables
            .invoices
            .values()
            .filter(|i| i.status == InvoiceStatus::Pending && i.created_at < cutoff)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        items.truncate(limit);
        Ok(items)
    }

    async fn transition_from_pending(
        &self,
        id: Uuid,
        status: InvoiceStatus,
        at: DateTime<Utc>,
    ) -> BookingResult<Option<Invoice>> {
        let mut tables = self.invoices.write().await;
        let invoice = tables
            .invoices
            .get_mut(&id)
            .ok_or_else(|| BookingError::not_found("Invoice", id))?;

        if !invoice.status.can_transition_to(status) {
            debug!(invoice_id = %id, from = %invoice.status, to = %status, "Skipping status write");
            return Ok(None);
        }
        invoice.status = status;
        invoice.updated_at = at;
        Ok(Some(invoice.clone()))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert_if_absent(&self, notification: Notification) -> BookingResult<bool> {
        let mut table = self.notifications.write().await;
        if !table.keys.insert(notification.dedupe_key()) {
            return Ok(false);
        }
        table.rows.insert(notification.id, notification);
        Ok(true)
    }

    async fn notifications_for(&self, user_id: Uuid) -> BookingResult<Vec<Notification>> {
        let table = self.notifications.read().await;
        let mut items: Vec<Notification> = table
            .rows
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.is_read()
                .cmp(&b.is_read())
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }

    async fn mark_read(
        &self,
        user_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> BookingResult<Notification> {
        let mut table = self.notifications.write().await;
        let notification = table
            .rows
            .get_mut(&id)
            .filter(|n| n.user_id == user_id)
            .ok_or_else(|| BookingError::not_found("Notification", id))?;

        if notification.read_at.is_none() {
            notification.read_at = Some(at);
        }
        Ok(notification.clone())
    }

    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> BookingResult<usize> {
        let mut table = self.notifications.write().await;
        let expired: Vec<Uuid> = table
            .rows
            .values()
            .filter(|n| n.read_at.is_some() && n.created_at < cutoff)
            .map(|n| n.id)
            .collect();

        for id in &expired {
            if let Some(n) = table.rows.remove(id) {
                table.keys.remove(&n.dedupe_key());
            }
        }
        Ok(expired.len())
    }
}
