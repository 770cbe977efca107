//! Domain layer: offerings, slot counters, the order ledger and their
//! repository interfaces.

pub mod offering;
pub mod reservation;
pub mod slot;

pub use offering::{Offering, OfferingRepository};
pub use reservation::{OrderLedger, Reservation, ReservationStatus};
pub use slot::SlotStore;

pub use crate::shared::errors::{DomainError, DomainResult};
