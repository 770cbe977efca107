//! Server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database and
//! migrations, backend selection, catalog seeding and bootstrap
//! reconciliation, the HTTP listener, and graceful shutdown.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::ReservationEngine;
use crate::config::{AppConfig, LedgerBackend, SlotStoreBackend};
use crate::domain::{Offering, OrderLedger, SlotStore};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{
    init_database, DatabaseConfig, InMemoryOrderLedger, InMemorySlotStore, RedisSlotStore,
    SeaOrmOfferingRepository, SeaOrmOrderLedger,
};
use crate::interfaces::http::create_api_router;
use crate::shared::retry::RetryConfig;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true)
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// Handle to a running reservation server.
///
/// ```rust,no_run
/// use seat_rush::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub engine: Arc<ReservationEngine>,
    /// The configuration the server was started with
    pub config: AppConfig,
    pub port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting Seat Rush...");

        let prometheus_handle = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db = init_database(&DatabaseConfig::from(&app_cfg.database)).await?;
        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Backends ───────────────────────────────────────────
        let store: Arc<dyn SlotStore> = match app_cfg.slot_store.backend {
            SlotStoreBackend::Memory => {
                info!("Slot counters: in-memory");
                Arc::new(InMemorySlotStore::new())
            }
            SlotStoreBackend::Redis => {
                info!(url = %app_cfg.slot_store.redis_url, "Slot counters: redis");
                Arc::new(
                    RedisSlotStore::connect(
                        &app_cfg.slot_store.redis_url,
                        app_cfg.slot_store.key_prefix.clone(),
                    )
                    .await?,
                )
            }
        };

        let enforce_unique = app_cfg.ledger.enforce_unique_requester;
        let ledger: Arc<dyn OrderLedger> = match app_cfg.ledger.backend {
            LedgerBackend::Database => Arc::new(SeaOrmOrderLedger::new(db.clone(), enforce_unique)),
            LedgerBackend::Memory => {
                warn!("Order ledger is in-memory; reservations are lost on restart");
                Arc::new(InMemoryOrderLedger::new(enforce_unique))
            }
        };
        let catalog = Arc::new(SeaOrmOfferingRepository::new(db.clone()));

        let engine = Arc::new(ReservationEngine::new(
            store,
            ledger,
            catalog,
            RetryConfig::from(&app_cfg.compensation),
        ));

        // ── Catalog seed + reconciliation ──────────────────────
        let seed: Vec<Offering> = app_cfg.offerings.iter().map(Offering::from).collect();
        engine.bootstrap(seed).await?;

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── HTTP server ────────────────────────────────────────
        let router = create_api_router(engine.clone(), db.clone(), prometheus_handle);

        let addr = app_cfg.server.address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();
        info!("HTTP server listening on http://{}", addr);
        info!("Swagger UI available at http://{}/docs/", addr);

        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("🛑 HTTP server received shutdown signal");
        });
        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "HTTP server error");
            }
        });

        info!("🚀 Seat Rush started");
        Ok(Self {
            engine,
            config: app_cfg,
            port,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for in-flight requests to drain (bounded by
    /// `server.shutdown_timeout`), then close the database.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        let drained = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => error!(error = %e, "HTTP server task panicked"),
                }
            })
            .await;
        if !drained {
            warn!("In-flight requests did not finish before the shutdown timeout");
        }

        if let Err(e) = db.close().await {
            warn!(error = %e, "Error closing database connection");
        } else {
            info!("✅ Database connection closed");
        }
        info!("👋 Seat Rush shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// The global recorder can only be installed once per process; restarts
/// within the same process reuse it.
fn prometheus_handle() -> PrometheusHandle {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    PROM_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("Failed to install Prometheus metrics recorder");
            info!("📊 Prometheus metrics recorder installed");
            handle
        })
        .clone()
}

/// Initialize tracing from the application config. `RUST_LOG` wins over
/// `logging.level` when set.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OfferingSeed;

    fn test_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 0;
        cfg.server.shutdown_timeout = 5;
        cfg.database.url = "sqlite::memory:".to_string();
        cfg.database.max_connections = 1;
        cfg.offerings = vec![OfferingSeed {
            id: "1".to_string(),
            title: "Rust Fundamentals".to_string(),
            capacity: 3,
            price: 0,
        }];
        cfg
    }

    #[tokio::test]
    async fn start_bootstraps_catalog_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            auto_migrate: true,
        })
        .await
        .unwrap();

        assert_ne!(handle.port, 0);
        assert!(handle.is_running());

        let status = handle.engine.get_status().await.unwrap();
        assert_eq!(status.remaining.get("1"), Some(&3));
        assert!(handle.engine.reserve("1", "alice").await.is_granted());

        tokio::time::timeout(std::time::Duration::from_secs(5), handle.shutdown())
            .await
            .expect("shutdown timed out");
    }
}
