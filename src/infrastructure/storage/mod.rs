//! Non-database backends for the slot store, order ledger and catalog

mod memory;
mod redis_store;

pub use memory::{InMemoryOfferingRepository, InMemoryOrderLedger, InMemorySlotStore};
pub use redis_store::RedisSlotStore;
