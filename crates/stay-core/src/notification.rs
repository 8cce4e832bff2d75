//! # Notification Records
//!
//! Per-user, per-event notifications. `read_at == None` means unread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event that produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An invoice moved to `paid`
    InvoicePaid,
}

/// A stored notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,

    /// Invoice the event is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Uuid>,

    /// Event payload
    pub data: serde_json::Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: Uuid, kind: NotificationKind, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            invoice_id: None,
            data,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    /// Builder: attach an invoice
    pub fn for_invoice(mut self, invoice_id: Uuid) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }

    /// Key used to make creation idempotent
    pub fn dedupe_key(&self) -> (Uuid, NotificationKind, Option<Uuid>) {
        (self.user_id, self.kind, self.invoice_id)
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dedupe_key_ignores_payload() {
        let user = Uuid::new_v4();
        let invoice = Uuid::new_v4();
        let a = Notification::new(user, NotificationKind::InvoicePaid, json!({"n": 1}))
            .for_invoice(invoice);
        let b = Notification::new(user, NotificationKind::InvoicePaid, json!({"n": 2}))
            .for_invoice(invoice);

        assert_ne!(a.id, b.id);
        assert_eq!(a.dedupe_key(), b.dedupe_key());
        assert!(!a.is_read());
    }
}
