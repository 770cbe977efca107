//! Per-offering readiness gates
//!
//! Each offering has a gate that admits reservations (shared) or one
//! reconciliation (exclusive). A gate is closed until its first resync
//! completes. While a resync is queued or running, new reservation attempts
//! are turned away instead of waiting; attempts already in flight finish
//! before the resync starts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::domain::{DomainError, DomainResult};

#[derive(Default)]
struct Gate {
    ready: AtomicBool,
    lock: Arc<RwLock<()>>,
}

/// Held by a reservation attempt for its whole duration.
pub struct AdmissionPermit {
    _guard: OwnedRwLockReadGuard<()>,
}

/// Exclusive access to one offering for a resync. Dropping it without
/// calling [`complete`](Self::complete) leaves the offering not ready.
pub struct ResyncPermit {
    gate: Arc<Gate>,
    _guard: OwnedRwLockWriteGuard<()>,
}

impl ResyncPermit {
    /// Open the gate for reservations.
    pub fn complete(self) {
        self.gate.ready.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct ReadinessGates {
    gates: DashMap<String, Arc<Gate>>,
}

impl ReadinessGates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit one reservation attempt for `offering_id`.
    ///
    /// `NotFound` when the offering was never registered, `NotReady` when it
    /// is (or is about to be) under reconciliation or never finished one.
    pub fn admit(&self, offering_id: &str) -> DomainResult<AdmissionPermit> {
        let gate = self
            .gates
            .get(offering_id)
            .map(|g| Arc::clone(g.value()))
            .ok_or_else(|| DomainError::offering_not_found(offering_id))?;

        let guard = gate
            .lock
            .clone()
            .try_read_owned()
            .map_err(|_| DomainError::NotReady(offering_id.to_string()))?;

        if !gate.ready.load(Ordering::SeqCst) {
            return Err(DomainError::NotReady(offering_id.to_string()));
        }
        Ok(AdmissionPermit { _guard: guard })
    }

    /// Take exclusive access to `offering_id`, registering it if needed.
    ///
    /// Waits for in-flight attempts to drain; at most one holder per
    /// offering at a time. The offering is marked not ready until the
    /// returned permit is completed.
    pub async fn exclusive(&self, offering_id: &str) -> ResyncPermit {
        let gate = Arc::clone(
            self.gates
                .entry(offering_id.to_string())
                .or_default()
                .value(),
        );
        let guard = gate.lock.clone().write_owned().await;
        gate.ready.store(false, Ordering::SeqCst);

        ResyncPermit {
            gate,
            _guard: guard,
        }
    }

    pub fn is_ready(&self, offering_id: &str) -> bool {
        self.gates
            .get(offering_id)
            .map(|g| g.ready.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}
