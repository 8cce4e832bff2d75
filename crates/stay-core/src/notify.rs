//! # Notification Dispatch
//!
//! Fans "invoice paid" events out to the invoice owner and every super
//! admin. Publishing is fire-and-forget: failures are logged and never reach
//! the confirmation or reconciliation caller.
//!
//! Two sinks are available:
//! - [`NotificationDispatcher`] writes notification records inline.
//! - [`QueuedSink`] hands events to a worker task over an mpsc channel and
//!   retries failed dispatches. Record creation is idempotent, so a retry
//!   after a partial fan-out never duplicates a notification.

use crate::error::BookingResult;
use crate::invoice::InvoicePaid;
use crate::notification::{Notification, NotificationKind};
use crate::repository::{SharedNotifications, SharedUsers};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Receiver of committed "paid" events
#[async_trait]
pub trait PaidEventSink: Send + Sync {
    async fn publish(&self, event: InvoicePaid);
}

/// Type alias for a shared sink
pub type SharedSink = Arc<dyn PaidEventSink>;

/// Creates notification records for paid events
pub struct NotificationDispatcher {
    users: SharedUsers,
    notifications: SharedNotifications,
}

impl NotificationDispatcher {
    pub fn new(users: SharedUsers, notifications: SharedNotifications) -> Self {
        Self {
            users,
            notifications,
        }
    }

    /// Owner first, then super admins, without duplicates
    async fn recipients(&self, event: &InvoicePaid) -> BookingResult<Vec<Uuid>> {
        let mut recipients = vec![event.user_id];
        for admin in self.users.super_admins().await? {
            if !recipients.contains(&admin.id) {
                recipients.push(admin.id);
            }
        }
        Ok(recipients)
    }

    /// Write one notification per recipient.
    ///
    /// Returns the number of records created. Fails if any recipient could
    /// not be written; records created before the failure are kept.
    pub async fn dispatch(&self, event: &InvoicePaid) -> BookingResult<usize> {
        let data = json!({
            "invoice_id": event.invoice_id,
            "total_cost": event.total_cost,
            "paid_at": event.paid_at,
        });

        let mut created = 0;
        let mut first_error = None;
        for user_id in self.recipients(event).await? {
            let notification = Notification::new(user_id, NotificationKind::InvoicePaid, data.clone())
                .for_invoice(event.invoice_id);
            match self.notifications.insert_if_absent(notification).await {
                Ok(true) => created += 1,
                Ok(false) => debug!(%user_id, invoice_id = %event.invoice_id, "Notification already exists"),
                Err(e) => {
                    warn!(%user_id, invoice_id = %event.invoice_id, "Failed to store notification: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(created),
        }
    }
}

#[async_trait]
impl PaidEventSink for NotificationDispatcher {
    async fn publish(&self, event: InvoicePaid) {
        match self.dispatch(&event).await {
            Ok(created) => info!(invoice_id = %event.invoice_id, created, "Paid notifications dispatched"),
            Err(e) => error!(invoice_id = %event.invoice_id, "Paid notification dispatch failed: {}", e),
        }
    }
}

/// Sink that queues events for a background worker
#[derive(Clone)]
pub struct QueuedSink {
    tx: mpsc::UnboundedSender<InvoicePaid>,
}

impl QueuedSink {
    /// Spawn the worker; it exits once every `QueuedSink` clone is dropped
    pub fn spawn(
        dispatcher: Arc<NotificationDispatcher>,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<InvoicePaid>();

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                deliver(&dispatcher, &event, max_attempts.max(1), retry_delay).await;
            }
            debug!("Notification queue closed");
        });

        (Self { tx }, handle)
    }
}

async fn deliver(
    dispatcher: &NotificationDispatcher,
    event: &InvoicePaid,
    max_attempts: u32,
    retry_delay: Duration,
) {
    for attempt in 1..=max_attempts {
        match dispatcher.dispatch(event).await {
            Ok(created) => {
                info!(invoice_id = %event.invoice_id, created, attempt, "Paid notifications dispatched");
                return;
            }
            Err(e) if attempt < max_attempts => {
                warn!(invoice_id = %event.invoice_id, attempt, "Dispatch failed, retrying: {}", e);
                tokio::time::sleep(retry_delay).await;
            }
            Err(e) => {
                error!(invoice_id = %event.invoice_id, attempt, "Dispatch failed, giving up: {}", e);
            }
        }
    }
}

#[async_trait]
impl PaidEventSink for QueuedSink {
    async fn publish(&self, event: InvoicePaid) {
        if let Err(e) = self.tx.send(event) {
            error!(invoice_id = %e.0.invoice_id, "Notification queue is closed; event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BookingError;
    use crate::memory::MemoryStore;
    use crate::pricing::{Currency, Price};
    use crate::repository::{NotificationRepository, UserRepository};
    use crate::user::{Role, User};
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn paid_event(user_id: Uuid) -> InvoicePaid {
        InvoicePaid {
            invoice_id: Uuid::new_v4(),
            user_id,
            total_cost: Price::from_cents(12_000, Currency::USD),
            paid_at: Utc::now(),
        }
    }

    async fn store_with_admins() -> (Arc<MemoryStore>, User, Vec<User>) {
        let store = Arc::new(MemoryStore::new());
        let guest = User::new("Guest", "guest@stay.io", Role::User);
        let admins = vec![
            User::new("Root", "root@stay.io", Role::SuperAdmin),
            User::new("Boss", "boss@stay.io", Role::SuperAdmin),
        ];
        store.add_user(guest.clone()).await;
        store.add_user(User::new("Desk", "desk@stay.io", Role::Admin)).await;
        for admin in &admins {
            store.add_user(admin.clone()).await;
        }
        (store, guest, admins)
    }

    #[tokio::test]
    async fn test_fan_out_to_owner_and_super_admins() {
        let (store, guest, admins) = store_with_admins().await;
        let dispatcher = NotificationDispatcher::new(store.clone(), store.clone());

        let created = dispatcher.dispatch(&paid_event(guest.id)).await.unwrap();
        assert_eq!(created, 3);

        assert_eq!(store.notifications_for(guest.id).await.unwrap().len(), 1);
        for admin in &admins {
            assert_eq!(store.notifications_for(admin.id).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_dispatch_is_idempotent() {
        let (store, guest, _) = store_with_admins().await;
        let dispatcher = NotificationDispatcher::new(store.clone(), store.clone());
        let event = paid_event(guest.id);

        assert_eq!(dispatcher.dispatch(&event).await.unwrap(), 3);
        assert_eq!(dispatcher.dispatch(&event).await.unwrap(), 0);
        assert_eq!(store.notifications_for(guest.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_super_admin_owner_notified_once() {
        let (store, _, admins) = store_with_admins().await;
        let dispatcher = NotificationDispatcher::new(store.clone(), store.clone());

        let created = dispatcher.dispatch(&paid_event(admins[0].id)).await.unwrap();
        assert_eq!(created, 2);
    }

    /// Fails the first `failures` inserts, then delegates
    struct FlakyNotifications {
        inner: Arc<MemoryStore>,
        failures: AtomicU32,
    }

    #[async_trait]
    impl NotificationRepository for FlakyNotifications {
        async fn insert_if_absent(&self, n: Notification) -> BookingResult<bool> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |f| f.checked_sub(1))
                .is_ok()
            {
                return Err(BookingError::Persistence("connection reset".into()));
            }
            self.inner.insert_if_absent(n).await
        }

        async fn notifications_for(&self, user_id: Uuid) -> BookingResult<Vec<Notification>> {
            self.inner.notifications_for(user_id).await
        }

        async fn mark_read(
            &self,
            user_id: Uuid,
            id: Uuid,
            at: DateTime<Utc>,
        ) -> BookingResult<Notification> {
            self.inner.mark_read(user_id, id, at).await
        }

        async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> BookingResult<usize> {
            self.inner.delete_read_before(cutoff).await
        }
    }

    #[tokio::test]
    async fn test_queued_sink_retries_until_delivered() {
        let (store, guest, _) = store_with_admins().await;
        let flaky = Arc::new(FlakyNotifications {
            inner: store.clone(),
            failures: AtomicU32::new(2),
        });
        let dispatcher = Arc::new(NotificationDispatcher::new(store.clone(), flaky));

        let (sink, handle) = QueuedSink::spawn(dispatcher, 5, Duration::from_millis(1));
        sink.publish(paid_event(guest.id)).await;
        drop(sink);
        handle.await.unwrap();

        assert_eq!(store.notifications_for(guest.id).await.unwrap().len(), 1);
        assert!(store.find_user(guest.id).await.unwrap().is_some());
        let total: usize = {
            let mut n = 0;
            for user in store.super_admins().await.unwrap() {
                n += store.notifications_for(user.id).await.unwrap().len();
            }
            n
        };
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_queued_events_drain_after_last_sink_drops() {
        let (store, guest, _) = store_with_admins().await;
        let dispatcher = Arc::new(NotificationDispatcher::new(store.clone(), store.clone()));

        let (sink, handle) = QueuedSink::spawn(dispatcher, 1, Duration::from_millis(1));
        let clone = sink.clone();
        for _ in 0..3 {
            sink.publish(paid_event(guest.id)).await;
        }
        clone.publish(paid_event(guest.id)).await;
        drop(sink);
        drop(clone);

        handle.await.unwrap();
        assert_eq!(store.notifications_for(guest.id).await.unwrap().len(), 4);
    }
}
