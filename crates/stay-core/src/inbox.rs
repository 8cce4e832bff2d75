//! Per-user notification inbox

use crate::error::BookingResult;
use crate::notification::Notification;
use crate::repository::SharedNotifications;
use crate::user::RequestContext;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct Inbox {
    notifications: SharedNotifications,
}

impl Inbox {
    pub fn new(notifications: SharedNotifications) -> Self {
        Self { notifications }
    }

    /// Caller's notifications, unread first, newest first within each group
    pub async fn list(&self, ctx: &RequestContext) -> BookingResult<Vec<Notification>> {
        self.notifications.notifications_for(ctx.user_id()).await
    }

    /// Mark one of the caller's notifications read. Already-read entries keep
    /// their original `read_at`.
    pub async fn mark_read(&self, ctx: &RequestContext, id: Uuid) -> BookingResult<Notification> {
        let notification = self
            .notifications
            .mark_read(ctx.user_id(), id, Utc::now())
            .await?;
        debug!(notification_id = %id, user_id = %ctx.user_id(), "Notification read");
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::notification::NotificationKind;
    use crate::repository::NotificationRepository;
    use crate::user::{Role, User};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_and_mark_read() {
        let store = Arc::new(MemoryStore::new());
        let inbox = Inbox::new(store.clone());
        let ctx = RequestContext::new(User::new("Guest", "guest@stay.io", Role::User));
        let other = RequestContext::new(User::new("Other", "other@stay.io", Role::User));

        let note = Notification::new(ctx.user_id(), NotificationKind::InvoicePaid, json!({}))
            .for_invoice(Uuid::new_v4());
        let id = note.id;
        store.insert_if_absent(note).await.unwrap();

        assert_eq!(inbox.list(&ctx).await.unwrap().len(), 1);
        assert!(inbox.list(&other).await.unwrap().is_empty());

        let err = inbox.mark_read(&other, id).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let first = inbox.mark_read(&ctx, id).await.unwrap();
        let second = inbox.mark_read(&ctx, id).await.unwrap();
        assert!(first.is_read());
        assert_eq!(first.read_at, second.read_at);
    }
}
