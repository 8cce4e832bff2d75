//! # Catalog Types
//!
//! Room types, rooms and services that can be booked.
//! Every entity supports soft-delete and restore; deleted entries are hidden
//! from listings and cannot be booked.

use crate::error::{BookingError, BookingResult};
use crate::pricing::Rates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A category of room sharing the same rates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomType {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rates: Rates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RoomType {
    pub fn new(name: impl Into<String>, rates: Rates) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            rates,
            deleted_at: None,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

/// A physical room; priced by its room type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Room {
    pub fn new(room_type_id: Uuid, number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_type_id,
            number: number.into(),
            deleted_at: None,
        }
    }
}

/// An add-on service (parking, cleaning, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rates: Rates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Service {
    pub fn new(name: impl Into<String>, rates: Rates) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            rates,
            deleted_at: None,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

/// Kinds of catalog entity managed through the admin surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    RoomType,
    Room,
    Service,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::RoomType => "room_type",
            CatalogKind::Room => "room",
            CatalogKind::Service => "service",
        }
    }

    /// Entity label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            CatalogKind::RoomType => "Room type",
            CatalogKind::Room => "Room",
            CatalogKind::Service => "Service",
        }
    }

    /// Parse the plural path segment used by the HTTP API
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "room-types" => Some(CatalogKind::RoomType),
            "rooms" => Some(CatalogKind::Room),
            "services" => Some(CatalogKind::Service),
            _ => None,
        }
    }
}

/// What a booking line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookableKind {
    Room,
    Service,
}

/// Reference to a bookable entity: `{"type": "room", "id": "..."}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookableRef {
    #[serde(rename = "type")]
    pub kind: BookableKind,
    pub id: Uuid,
}

impl BookableRef {
    pub fn room(id: Uuid) -> Self {
        Self {
            kind: BookableKind::Room,
            id,
        }
    }

    pub fn service(id: Uuid) -> Self {
        Self {
            kind: BookableKind::Service,
            id,
        }
    }
}

/// A resolved bookable entity with its current rates
#[derive(Debug, Clone)]
pub enum Bookable {
    Room { room: Room, room_type: RoomType },
    Service(Service),
}

impl Bookable {
    pub fn reference(&self) -> BookableRef {
        match self {
            Bookable::Room { room, .. } => BookableRef::room(room.id),
            Bookable::Service(service) => BookableRef::service(service.id),
        }
    }

    pub fn rates(&self) -> &Rates {
        match self {
            Bookable::Room { room_type, .. } => &room_type.rates,
            Bookable::Service(service) => &service.rates,
        }
    }

    /// Display name for invoices and notifications
    pub fn display_name(&self) -> String {
        match self {
            Bookable::Room { room, room_type } => format!("{} #{}", room_type.name, room.number),
            Bookable::Service(service) => service.name.clone(),
        }
    }

    /// A room is bookable only while both it and its room type are active
    pub fn ensure_active(&self) -> BookingResult<()> {
        let deleted = match self {
            Bookable::Room { room, room_type } => {
                room.deleted_at.is_some() || room_type.deleted_at.is_some()
            }
            Bookable::Service(service) => service.deleted_at.is_some(),
        };
        if deleted {
            let r = self.reference();
            let entity = match r.kind {
                BookableKind::Room => "Room",
                BookableKind::Service => "Service",
            };
            return Err(BookingError::not_found(entity, r.id));
        }
        Ok(())
    }
}

/// Catalog seed (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub room_types: Vec<RoomType>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub services: Vec<Service>,
}
