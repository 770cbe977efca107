//! # Seat Rush
//!
//! Flash-sale slot reservation engine. Many concurrent buyers compete for a
//! small, fixed number of slots per course; the engine never grants more
//! slots than exist and keeps its fast counters in agreement with a durable
//! order ledger.
//!
//! - **domain**: offerings, reservations and the store/ledger/catalog traits
//! - **application**: reservation coordinator, reconciliation, engine
//! - **infrastructure**: in-memory and Redis slot counters, SeaORM ledger and catalog
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: process lifecycle

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::create_api_router;
