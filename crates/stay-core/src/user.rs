//! # Users and Request Context
//!
//! Accounts, roles, and the explicit per-request context handed to every
//! service call.

use crate::error::{BookingError, BookingResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role >= Role::Admin
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

/// Who is calling, and in which locale
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: User,
    pub locale: String,
}

impl RequestContext {
    pub fn new(user: User) -> Self {
        Self {
            user,
            locale: "en".to_string(),
        }
    }

    /// Builder: set locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Fail with `Forbidden` unless the caller is an admin or super admin
    pub fn require_admin(&self) -> BookingResult<()> {
        if self.user.is_admin() {
            Ok(())
        } else {
            Err(BookingError::Forbidden(format!(
                "user {} is not an administrator",
                self.user.id
            )))
        }
    }
}

/// User seed (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSeed {
    #[serde(default)]
    pub users: Vec<User>,
}
