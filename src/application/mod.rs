//! Application layer: reservation attempts, reconciliation and the engine
//! that ties them to concrete backends.

pub mod engine;
pub mod reconciliation;
pub mod reservation;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{OfferingStatus, ReservationEngine, SystemStatus};
pub use reconciliation::{ReadinessGates, ReconciliationService, ResyncMode};
pub use reservation::{RejectReason, ReservationCoordinator, ReserveOutcome};
