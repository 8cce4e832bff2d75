//! Catalog management.
//!
//! Listings are public and only show active entries. Creating, deleting and
//! restoring require the `admin` or `super_admin` role.

use crate::catalog::{CatalogKind, Room, RoomType, Service};
use crate::error::{BookingError, BookingResult};
use crate::pricing::Rates;
use crate::repository::SharedCatalog;
use crate::user::RequestContext;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

/// Payload for a new room type or service
#[derive(Debug, Clone, Deserialize)]
pub struct NewPriced {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rates: Rates,
}

impl NewPriced {
    fn validate(&self) -> BookingResult<()> {
        if self.name.trim().is_empty() {
            return Err(BookingError::Validation("name must not be empty".into()));
        }
        self.rates.validate()
    }
}

/// Payload for a new room
#[derive(Debug, Clone, Deserialize)]
pub struct NewRoom {
    pub room_type_id: Uuid,
    pub number: String,
}

#[derive(Clone)]
pub struct CatalogService {
    catalog: SharedCatalog,
}

impl CatalogService {
    pub fn new(catalog: SharedCatalog) -> Self {
        Self { catalog }
    }

    pub async fn room_types(&self) -> BookingResult<Vec<RoomType>> {
        self.catalog.room_types(false).await
    }

    pub async fn rooms(&self) -> BookingResult<Vec<Room>> {
        self.catalog.rooms(false).await
    }

    pub async fn services(&self) -> BookingResult<Vec<Service>> {
        self.catalog.services(false).await
    }

    pub async fn create_room_type(
        &self,
        ctx: &RequestContext,
        input: NewPriced,
    ) -> BookingResult<RoomType> {
        ctx.require_admin()?;
        input.validate()?;

        let room_type = self
            .catalog
            .insert_room_type(RoomType::new(input.name, input.rates).with_description(input.description))
            .await?;
        info!(room_type_id = %room_type.id, by = %ctx.user_id(), "Room type created");
        Ok(room_type)
    }

    pub async fn create_room(&self, ctx: &RequestContext, input: NewRoom) -> BookingResult<Room> {
        ctx.require_admin()?;
        if input.number.trim().is_empty() {
            return Err(BookingError::Validation("room number must not be empty".into()));
        }

        let room = self
            .catalog
            .insert_room(Room::new(input.room_type_id, input.number))
            .await?;
        info!(room_id = %room.id, by = %ctx.user_id(), "Room created");
        Ok(room)
    }

    pub async fn create_service(
        &self,
        ctx: &RequestContext,
        input: NewPriced,
    ) -> BookingResult<Service> {
        ctx.require_admin()?;
        input.validate()?;

        let service = self
            .catalog
            .insert_service(Service::new(input.name, input.rates).with_description(input.description))
            .await?;
        info!(service_id = %service.id, by = %ctx.user_id(), "Service created");
        Ok(service)
    }

    /// Soft delete; deleting twice is a validation error
    pub async fn delete(&self, ctx: &RequestContext, kind: CatalogKind, id: Uuid) -> BookingResult<()> {
        ctx.require_admin()?;
        if !self.catalog.set_deleted(kind, id, Some(Utc::now())).await? {
            return Err(BookingError::Validation(format!(
                "{} {} is already deleted",
                kind.label(),
                id
            )));
        }
        info!(kind = kind.as_str(), %id, by = %ctx.user_id(), "Catalog entry deleted");
        Ok(())
    }

    /// Undo a soft delete; restoring an active entry is a validation error
    pub async fn restore(&self, ctx: &RequestContext, kind: CatalogKind, id: Uuid) -> BookingResult<()> {
        ctx.require_admin()?;
        if !self.catalog.set_deleted(kind, id, None).await? {
            return Err(BookingError::Validation(format!(
                "{} {} is not deleted",
                kind.label(),
                id
            )));
        }
        info!(kind = kind.as_str(), %id, by = %ctx.user_id(), "Catalog entry restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::pricing::{Currency, Price};
    use crate::user::{Role, User};
    use std::sync::Arc;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::new()))
    }

    fn ctx(role: Role) -> RequestContext {
        RequestContext::new(User::new("Someone", "someone@stay.io", role))
    }

    fn priced(name: &str) -> NewPriced {
        NewPriced {
            name: name.into(),
            description: String::new(),
            rates: Rates {
                monthly: Price::from_cents(80_000, Currency::EUR),
                daily: Price::from_cents(3_500, Currency::EUR),
            },
        }
    }

    #[tokio::test]
    async fn test_guests_cannot_manage_catalog() {
        let catalog = service();
        let err = catalog
            .create_room_type(&ctx(Role::User), priced("Suite"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Forbidden(_)));
        assert!(catalog.room_types().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_creates_and_lists() {
        let catalog = service();
        let admin = ctx(Role::Admin);
        let suite = catalog.create_room_type(&admin, priced("Suite")).await.unwrap();
        catalog
            .create_room(
                &admin,
                NewRoom {
                    room_type_id: suite.id,
                    number: "301".into(),
                },
            )
            .await
            .unwrap();
        catalog.create_service(&admin, priced("Breakfast")).await.unwrap();

        assert_eq!(catalog.room_types().await.unwrap().len(), 1);
        assert_eq!(catalog.rooms().await.unwrap()[0].number, "301");
        assert_eq!(catalog.services().await.unwrap()[0].name, "Breakfast");
    }

    #[tokio::test]
    async fn test_room_needs_existing_type() {
        let catalog = service();
        let err = catalog
            .create_room(
                &ctx(Role::SuperAdmin),
                NewRoom {
                    room_type_id: Uuid::new_v4(),
                    number: "1".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_rejects_mixed_currency_rates() {
        let catalog = service();
        let mut input = priced("Laundry");
        input.rates.daily = Price::from_cents(100, Currency::USD);
        let err = catalog
            .create_service(&ctx(Role::Admin), input)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_and_restore_cycle() {
        let catalog = service();
        let admin = ctx(Role::Admin);
        let spa = catalog.create_service(&admin, priced("Spa")).await.unwrap();

        catalog.delete(&admin, CatalogKind::Service, spa.id).await.unwrap();
        assert!(catalog.services().await.unwrap().is_empty());

        let twice = catalog.delete(&admin, CatalogKind::Service, spa.id).await.unwrap_err();
        assert!(matches!(twice, BookingError::Validation(_)));

        catalog.restore(&admin, CatalogKind::Service, spa.id).await.unwrap();
        assert_eq!(catalog.services().await.unwrap().len(), 1);

        let again = catalog.restore(&admin, CatalogKind::Service, spa.id).await.unwrap_err();
        assert!(matches!(again, BookingError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let err = service()
            .delete(&ctx(Role::Admin), CatalogKind::Room, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
