//! # stay-booking
//!
//! Booking, invoicing and payment reconciliation server.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//!
//! # Run the server (seed data from config/seed.toml)
//! stay-booking
//! ```

use stay_api::{routes, state::AppState};
use stay_core::{spawn_reconciliation, spawn_retention};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let (state, notify_worker) = AppState::from_env().await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.provider);
    info!(
        interval_secs = state.config.reconcile_interval.as_secs(),
        grace_secs = state.config.reconcile.grace_period.num_seconds(),
        batch_size = state.config.reconcile.batch_size,
        "Invoice reconciliation configured"
    );

    // Background jobs
    let shutdown = CancellationToken::new();
    let reconcile_job = spawn_reconciliation(
        state.reconciler.clone(),
        state.config.reconcile_interval,
        shutdown.clone(),
    );
    let retention_job = spawn_retention(
        state.notifications.clone(),
        state.config.retention_interval,
        shutdown.clone(),
    );

    let app = routes::create_router(state);

    info!("stay-booking starting on http://{}", addr);
    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Bookings: POST http://{}/api/v1/bookings", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Stopping background jobs");
    shutdown.cancel();
    let _ = tokio::join!(reconcile_job, retention_job);

    // Every sink clone is gone now; wait for queued paid events to drain.
    if let Err(e) = notify_worker.await {
        tracing::error!("Notification worker failed: {}", e);
    }
    info!("Notification queue drained");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
