//! Infrastructure layer - external concerns
//!
//! - `database`: SeaORM catalog and order ledger
//! - `storage`: in-memory and Redis slot counters, in-memory ledger/catalog

pub mod database;
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmOfferingRepository, SeaOrmOrderLedger};
pub use storage::{InMemoryOfferingRepository, InMemoryOrderLedger, InMemorySlotStore, RedisSlotStore};
