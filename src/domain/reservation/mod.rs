//! Reservation aggregate
//!
//! Contains the committed Reservation entity and the order ledger interface.

pub mod ledger;
pub mod model;

pub use ledger::OrderLedger;
pub use model::{Reservation, ReservationStatus};
