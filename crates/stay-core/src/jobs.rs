//! Background jobs: the reconciliation sweep and notification retention.
//!
//! Both run as single tokio tasks on a `tokio::time::interval` and stop when
//! the shutdown token is cancelled.

use crate::error::{BookingError, BookingResult};
use crate::reconcile::Reconciler;
use crate::repository::SharedNotifications;
use chrono::{DateTime, Months, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Shortest period a job will run at
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Spawn the periodic reconciliation sweep
pub fn spawn_reconciliation(
    reconciler: Arc<Reconciler>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_every(every, shutdown, "reconciliation", move || {
        let reconciler = reconciler.clone();
        async move {
            if let Err(e) = reconciler.run().await {
                error!("Error while selecting pending invoices: {}", e);
            }
        }
    }))
}

/// Spawn the periodic purge of read notifications
pub fn spawn_retention(
    notifications: SharedNotifications,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_every(every, shutdown, "retention", move || {
        let notifications = notifications.clone();
        async move {
            if let Err(e) = purge_read_notifications(&notifications, Utc::now()).await {
                error!("Error while purging read notifications: {}", e);
            }
        }
    }))
}

/// Delete read notifications created more than one calendar month before `now`
pub async fn purge_read_notifications(
    notifications: &SharedNotifications,
    now: DateTime<Utc>,
) -> BookingResult<usize> {
    let cutoff = now
        .checked_sub_months(Months::new(1))
        .ok_or_else(|| BookingError::Internal(format!("retention cutoff underflow at {}", now)))?;

    let deleted = notifications.delete_read_before(cutoff).await?;
    info!(deleted, %cutoff, "Read notifications purged");
    Ok(deleted)
}

async fn run_every<F, Fut>(
    every: Duration,
    shutdown: CancellationToken,
    name: &'static str,
    mut tick: F,
) where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let every = if every < MIN_PERIOD {
        warn!(job = name, requested_ms = every.as_millis() as u64, "Job period too short, using minimum");
        MIN_PERIOD
    } else {
        every
    };

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(job = name, period_secs = every.as_secs(), "Background job started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => tick().await,
        }
    }

    info!(job = name, "Background job stopped");
}
