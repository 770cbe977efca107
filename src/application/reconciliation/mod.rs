//! Reconciliation of slot counters against the order ledger

pub mod readiness;
pub mod service;

pub use readiness::{AdmissionPermit, ReadinessGates, ResyncPermit};
pub use service::{ReconciliationService, ResyncMode};
