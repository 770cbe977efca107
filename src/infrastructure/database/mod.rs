pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::{SeaOrmOfferingRepository, SeaOrmOrderLedger};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./seat-rush.db?mode=rwc")
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./seat-rush.db?mode=rwc".to_string(),
            max_connections: 10,
        }
    }
}

impl From<&crate::config::DatabaseSection> for DatabaseConfig {
    fn from(section: &crate::config::DatabaseSection) -> Self {
        Self {
            url: section.url.clone(),
            max_connections: section.max_connections.max(1),
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!(url = %config.url, "Connecting to database");
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(opts).await?;
    info!("Database connected successfully");
    Ok(db)
}
