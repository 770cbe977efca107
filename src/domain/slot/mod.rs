//! Slot counters

pub mod store;

pub use store::SlotStore;
