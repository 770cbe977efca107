//! Reservation attempts: admission, ledger commit, compensation

pub mod coordinator;
pub mod outcome;

pub use coordinator::ReservationCoordinator;
pub use outcome::{RejectReason, ReserveOutcome};
