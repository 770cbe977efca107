//! Reconciliation service
//!
//! Rebuilds slot counters from catalog capacity and the order ledger. Runs at
//! startup and on administrative reset, always with exclusive access to the
//! offerings it touches.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::readiness::{ReadinessGates, ResyncPermit};
use crate::domain::{DomainResult, Offering, OrderLedger, SlotStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncMode {
    /// `capacity - committed`: keep what the ledger already granted
    PreserveLedger,
    /// `capacity`: the ledger has been (or is being) cleared
    Fresh,
}

impl ResyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreserveLedger => "preserve_ledger",
            Self::Fresh => "fresh",
        }
    }
}

pub struct ReconciliationService {
    store: Arc<dyn SlotStore>,
    ledger: Arc<dyn OrderLedger>,
    gates: Arc<ReadinessGates>,
}

impl ReconciliationService {
    pub fn new(
        store: Arc<dyn SlotStore>,
        ledger: Arc<dyn OrderLedger>,
        gates: Arc<ReadinessGates>,
    ) -> Self {
        Self {
            store,
            ledger,
            gates,
        }
    }

    /// Recompute the counter of every offering in `offerings`.
    ///
    /// All gates are taken before any counter is touched and opened only when
    /// every offering has been resynced; on error none of them reopen.
    pub async fn resync(&self, offerings: &[Offering], mode: ResyncMode) -> DomainResult<()> {
        let batch = dedupe(offerings);
        let permits = self.lock_all(&batch).await;

        for offering in batch.values() {
            self.resync_one(offering, mode).await?;
        }

        open_all(permits);
        metrics::counter!("reconciliation_runs_total", "mode" => mode.as_str()).increment(1);
        info!(offerings = batch.len(), mode = mode.as_str(), "Slot counters reconciled");
        Ok(())
    }

    /// Clear the ledger and restore every offering to full capacity.
    pub async fn reset(&self, offerings: &[Offering]) -> DomainResult<()> {
        let batch = dedupe(offerings);
        let permits = self.lock_all(&batch).await;

        self.ledger.clear().await?;
        warn!("Order ledger cleared by administrative reset");

        for offering in batch.values() {
            self.resync_one(offering, ResyncMode::Fresh).await?;
        }

        open_all(permits);
        metrics::counter!("reconciliation_runs_total", "mode" => "reset").increment(1);
        info!(offerings = batch.len(), "Administrative reset completed");
        Ok(())
    }

    /// Sorted acquisition so concurrent resets cannot deadlock each other.
    async fn lock_all(&self, batch: &BTreeMap<&str, &Offering>) -> Vec<ResyncPermit> {
        let mut permits = Vec::with_capacity(batch.len());
        for id in batch.keys() {
            permits.push(self.gates.exclusive(id).await);
        }
        permits
    }

    async fn resync_one(&self, offering: &Offering, mode: ResyncMode) -> DomainResult<()> {
        let baseline = match mode {
            ResyncMode::Fresh => offering.baseline(0),
            ResyncMode::PreserveLedger => {
                let committed = self.ledger.count(&offering.id).await?;
                if committed > offering.capacity.max(0) as u64 {
                    warn!(
                        offering_id = %offering.id,
                        capacity = offering.capacity,
                        committed,
                        "Ledger holds more reservations than capacity; clamping counter to 0"
                    );
                }
                offering.baseline(committed)
            }
        };

        self.store.set_baseline(&offering.id, baseline).await?;
        info!(
            offering_id = %offering.id,
            capacity = offering.capacity,
            remaining = baseline,
            "Loaded slots"
        );
        Ok(())
    }
}

fn dedupe(offerings: &[Offering]) -> BTreeMap<&str, &Offering> {
    offerings.iter().map(|o| (o.id.as_str(), o)).collect()
}

fn open_all(permits: Vec<ResyncPermit>) {
    for permit in permits {
        permit.complete();
    }
}
