//! # Application State
//!
//! Shared state for the Axum application: the booking services, the
//! reconciliation sweep, and the configuration they were built from.

use anyhow::Context;
use serde::Deserialize;
use stay_core::{
    BillingService, BoxedPaymentGateway, CatalogSeed, CatalogService, Inbox, MemoryStore,
    NotificationDispatcher, QueuedSink, ReconcileConfig, Reconciler, SharedNotifications,
    SharedSink, SharedUsers, UserSeed,
};
use stay_stripe::StripeGateway;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Seed file with users and catalog; searched for when unset
    pub seed_path: Option<String>,
    /// Period of the reconciliation sweep
    pub reconcile_interval: Duration,
    /// Sweep tuning
    pub reconcile: ReconcileConfig,
    /// Period of the read-notification purge
    pub retention_interval: Duration,
    /// Delivery attempts per paid event before it is dropped
    pub notify_max_attempts: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let grace_secs = env_or(
            "RECONCILE_GRACE_SECS",
            defaults.reconcile.grace_period.num_seconds(),
        );
        let processing_timeout = std::env::var("RECONCILE_PROCESSING_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .map(chrono::Duration::seconds);

        let config = Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            seed_path: std::env::var("SEED_PATH").ok(),
            reconcile_interval: Duration::from_secs(env_or(
                "RECONCILE_INTERVAL_SECS",
                defaults.reconcile_interval.as_secs(),
            )),
            reconcile: ReconcileConfig {
                grace_period: chrono::Duration::seconds(grace_secs),
                batch_size: env_or("RECONCILE_BATCH_SIZE", defaults.reconcile.batch_size),
                processing_timeout,
            },
            retention_interval: Duration::from_secs(env_or(
                "RETENTION_INTERVAL_SECS",
                defaults.retention_interval.as_secs(),
            )),
            notify_max_attempts: env_or("NOTIFY_MAX_ATTEMPTS", defaults.notify_max_attempts),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the background jobs cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.reconcile_interval.is_zero() {
            anyhow::bail!("RECONCILE_INTERVAL_SECS must be at least 1");
        }
        if self.retention_interval.is_zero() {
            anyhow::bail!("RETENTION_INTERVAL_SECS must be at least 1");
        }
        if self.reconcile.batch_size == 0 {
            anyhow::bail!("RECONCILE_BATCH_SIZE must be at least 1");
        }
        if self.reconcile.grace_period < chrono::Duration::zero() {
            anyhow::bail!("RECONCILE_GRACE_SECS must not be negative");
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            seed_path: None,
            reconcile_interval: Duration::from_secs(60),
            reconcile: ReconcileConfig::default(),
            retention_interval: Duration::from_secs(3600),
            notify_max_attempts: 5,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub billing: BillingService,
    pub catalog: CatalogService,
    pub inbox: Inbox,
    /// Resolves the caller of each request
    pub users: SharedUsers,
    pub notifications: SharedNotifications,
    pub reconciler: Arc<Reconciler>,
    /// Payment provider name, for logs and health
    pub provider: &'static str,
    pub config: AppConfig,
}

impl AppState {
    /// Wire services over one store, one gateway and one paid-event sink
    pub fn build(
        config: AppConfig,
        store: Arc<MemoryStore>,
        gateway: BoxedPaymentGateway,
        events: SharedSink,
    ) -> Self {
        let reconciler = Reconciler::new(
            store.clone(),
            gateway.clone(),
            events.clone(),
            config.reconcile.clone(),
        );

        Self {
            billing: BillingService::new(store.clone(), store.clone(), gateway.clone(), events),
            catalog: CatalogService::new(store.clone()),
            inbox: Inbox::new(store.clone()),
            users: store.clone(),
            notifications: store,
            reconciler: Arc::new(reconciler),
            provider: gateway.provider_name(),
            config,
        }
    }

    /// Production state: seeded store, Stripe gateway, queued notifications.
    ///
    /// Must be called inside a tokio runtime; the notification worker is
    /// spawned here. Its handle finishes once every clone of the state is
    /// dropped and the queue has drained.
    pub async fn from_env() -> anyhow::Result<(Self, JoinHandle<()>)> {
        let config = AppConfig::from_env()?;

        let store = Arc::new(MemoryStore::new());
        let seed = load_seed(config.seed_path.as_deref())?;
        store.load_catalog(seed.catalog).await?;
        for user in seed.users.users {
            store.add_user(user).await;
        }

        let gateway = StripeGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let dispatcher = Arc::new(NotificationDispatcher::new(store.clone(), store.clone()));
        let (sink, worker) =
            QueuedSink::spawn(dispatcher, config.notify_max_attempts, Duration::from_secs(2));

        let state = Self::build(config, store, Arc::new(gateway), Arc::new(sink));
        Ok((state, worker))
    }
}

/// Users plus catalog, as stored in `config/seed.toml`
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(flatten)]
    pub users: UserSeed,
    #[serde(flatten)]
    pub catalog: CatalogSeed,
}

impl Seed {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Load the seed from `path`, or from the first default location found
fn load_seed(path: Option<&str>) -> anyhow::Result<Seed> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path))?;
        return Seed::parse(&content).with_context(|| format!("Failed to parse {}", path));
    }

    let config_paths = [
        "config/seed.toml",
        "../config/seed.toml",
        "../../config/seed.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let seed = Seed::parse(&content).with_context(|| format!("Failed to parse {}", path))?;
            tracing::info!(
                users = seed.users.users.len(),
                room_types = seed.catalog.room_types.len(),
                rooms = seed.catalog.rooms.len(),
                services = seed.catalog.services.len(),
                "Loaded seed from {}",
                path
            );
            return Ok(seed);
        }
    }

    tracing::warn!("No seed file found, starting with an empty store");
    Ok(Seed::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stay_core::Role;

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.reconcile.processing_timeout.is_none());
    }

    #[test]
    fn test_zero_job_intervals_are_rejected() {
        let config = AppConfig {
            reconcile_interval: Duration::ZERO,
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("RECONCILE_INTERVAL_SECS"));

        let config = AppConfig {
            retention_interval: Duration::ZERO,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_seed() {
        let seed = Seed::parse(
            r#"
            [[users]]
            id = "5b0a6c9e-1d7e-4a43-9d0a-2f1c5b7e8a01"
            name = "Root"
            email = "root@stay.io"
            role = "super_admin"

            [[room_types]]
            id = "0f0e6a1c-6a0c-4c59-8c39-52c8a0c3b101"
            name = "Standard"
            rates = { monthly = { amount = 90000, currency = "usd" }, daily = { amount = 4000, currency = "usd" } }

            [[rooms]]
            id = "0f0e6a1c-6a0c-4c59-8c39-52c8a0c3b201"
            room_type_id = "0f0e6a1c-6a0c-4c59-8c39-52c8a0c3b101"
            number = "101"
            "#,
        )
        .unwrap();

        assert_eq!(seed.users.users.len(), 1);
        assert_eq!(seed.users.users[0].role, Role::SuperAdmin);
        assert_eq!(seed.catalog.room_types[0].rates.daily.amount, 4000);
        assert_eq!(seed.catalog.rooms[0].number, "101");
        assert!(seed.catalog.services.is_empty());
    }

    #[test]
    fn test_shipped_seed_parses() {
        let content = include_str!("../../../config/seed.toml");
        let seed = Seed::parse(content).unwrap();
        assert!(!seed.users.users.is_empty());
        assert!(!seed.catalog.room_types.is_empty());
    }
}
