//! Reservation engine
//!
//! Entry point of the core: wires the coordinator and the reconciliation
//! service to one set of backends and exposes the operations the HTTP layer
//! and the process lifecycle call.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::reconciliation::{ReadinessGates, ReconciliationService, ResyncMode};
use super::reservation::{RejectReason, ReservationCoordinator, ReserveOutcome};
use crate::domain::{DomainResult, Offering, OfferingRepository, OrderLedger, Reservation, SlotStore};
use crate::shared::retry::RetryConfig;

/// Snapshot for `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatus {
    /// Current counter value per offering
    pub remaining: BTreeMap<String, i64>,
    pub total_committed: u64,
}

/// One catalog entry with its live numbers.
#[derive(Debug, Clone)]
pub struct OfferingStatus {
    pub offering: Offering,
    pub remaining: i64,
    pub committed: u64,
    pub ready: bool,
}

pub struct ReservationEngine {
    store: Arc<dyn SlotStore>,
    ledger: Arc<dyn OrderLedger>,
    catalog: Arc<dyn OfferingRepository>,
    gates: Arc<ReadinessGates>,
    coordinator: Arc<ReservationCoordinator>,
    reconciliation: ReconciliationService,
}

impl ReservationEngine {
    pub fn new(
        store: Arc<dyn SlotStore>,
        ledger: Arc<dyn OrderLedger>,
        catalog: Arc<dyn OfferingRepository>,
        compensation_retry: RetryConfig,
    ) -> Self {
        let gates = Arc::new(ReadinessGates::new());
        let coordinator = Arc::new(ReservationCoordinator::new(
            store.clone(),
            ledger.clone(),
            gates.clone(),
            compensation_retry,
        ));
        let reconciliation =
            ReconciliationService::new(store.clone(), ledger.clone(), gates.clone());

        Self {
            store,
            ledger,
            catalog,
            gates,
            coordinator,
            reconciliation,
        }
    }

    /// Run one reservation attempt on its own task.
    ///
    /// Dropping the returned future does not abort the attempt: it still
    /// ends granted or fully compensated.
    pub async fn reserve(&self, offering_id: &str, requester_id: &str) -> ReserveOutcome {
        let coordinator = Arc::clone(&self.coordinator);
        let offering = offering_id.to_string();
        let requester = requester_id.to_string();

        let task = tokio::spawn(async move { coordinator.reserve(&offering, &requester).await });
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                // only reachable if the attempt panicked
                error!(offering_id, requester_id, error = %e, "Reservation task failed");
                ReserveOutcome::rejected(RejectReason::PersistenceFailure)
            }
        }
    }

    pub async fn get_status(&self) -> DomainResult<SystemStatus> {
        let mut remaining = BTreeMap::new();
        for offering in self.catalog.list().await? {
            let value = self.store.get(&offering.id).await?;
            remaining.insert(offering.id, value);
        }
        let total_committed = self.ledger.count_all().await?;

        Ok(SystemStatus {
            remaining,
            total_committed,
        })
    }

    pub async fn offering_statuses(&self) -> DomainResult<Vec<OfferingStatus>> {
        let offerings = self.catalog.list().await?;
        let mut statuses = Vec::with_capacity(offerings.len());
        for offering in offerings {
            let remaining = self.store.get(&offering.id).await?;
            let committed = self.ledger.count(&offering.id).await?;
            let ready = self.gates.is_ready(&offering.id);
            statuses.push(OfferingStatus {
                offering,
                remaining,
                committed,
                ready,
            });
        }
        Ok(statuses)
    }

    pub async fn list_recent(&self, limit: u64) -> DomainResult<Vec<Reservation>> {
        self.ledger.list_recent(limit).await
    }

    /// Clear the ledger and put every catalog offering back to full capacity.
    pub async fn admin_reset(&self) -> DomainResult<()> {
        let offerings = self.catalog.list().await?;
        self.reconciliation.reset(&offerings).await
    }

    /// Register `seed` in the catalog, then resync every catalog offering
    /// against the ledger. Reservations are rejected with `NOT_READY` until
    /// this returns `Ok`.
    pub async fn bootstrap(&self, seed: Vec<Offering>) -> DomainResult<()> {
        let seeded = seed.len();
        for offering in seed {
            match self.catalog.find_by_id(&offering.id).await? {
                None => info!(offering_id = %offering.id, capacity = offering.capacity, "Offering added"),
                Some(known) if known.capacity != offering.capacity => warn!(
                    offering_id = %offering.id,
                    from = known.capacity,
                    to = offering.capacity,
                    "Offering capacity changed"
                ),
                Some(_) => {}
            }
            self.catalog.upsert(offering).await?;
        }

        let offerings = self.catalog.list().await?;
        self.reconciliation
            .resync(&offerings, ResyncMode::PreserveLedger)
            .await?;

        info!(seeded, offerings = offerings.len(), "Reservation engine bootstrapped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::infrastructure::{InMemoryOfferingRepository, InMemoryOrderLedger, InMemorySlotStore};

    fn engine() -> (ReservationEngine, Arc<InMemorySlotStore>, Arc<InMemoryOrderLedger>) {
        let store = Arc::new(InMemorySlotStore::new());
        let ledger = Arc::new(InMemoryOrderLedger::default());
        let catalog = Arc::new(InMemoryOfferingRepository::new());
        let retry = RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(1),
        };
        let engine = ReservationEngine::new(store.clone(), ledger.clone(), catalog, retry);
        (engine, store, ledger)
    }

    fn courses() -> Vec<Offering> {
        vec![
            Offering::new("1", "Rust Fundamentals", 10, 0),
            Offering::new("2", "Async in Practice", 3, 0),
        ]
    }

    #[tokio::test]
    async fn offerings_are_unknown_before_bootstrap() {
        let (engine, _, _) = engine();
        let outcome = engine.reserve("1", "alice").await;
        assert_eq!(outcome.reason(), Some(RejectReason::NotFound));
    }

    #[tokio::test]
    async fn bootstrap_preserves_committed_reservations() {
        let (engine, store, ledger) = engine();
        ledger.append("1", "alice").await.unwrap();
        ledger.append("1", "bob").await.unwrap();

        engine.bootstrap(courses()).await.unwrap();

        assert_eq!(store.get("1").await.unwrap(), 8);
        assert_eq!(store.get("2").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn rebootstrap_applies_new_capacity() {
        let (engine, store, _) = engine();
        engine.bootstrap(courses()).await.unwrap();
        assert!(engine.reserve("2", "alice").await.is_granted());

        engine
            .bootstrap(vec![Offering::new("2", "Async in Practice", 5, 0)])
            .await
            .unwrap();

        assert_eq!(store.get("2").await.unwrap(), 4);
        assert_eq!(store.get("1").await.unwrap(), 10);
        let statuses = engine.offering_statuses().await.unwrap();
        assert_eq!(statuses[1].offering.capacity, 5);
    }

    #[tokio::test]
    async fn reset_restores_baseline() {
        let (engine, store, ledger) = engine();
        engine.bootstrap(courses()).await.unwrap();
        for i in 0..4 {
            assert!(engine.reserve("1", &format!("user-{i}")).await.is_granted());
        }
        assert_eq!(store.get("1").await.unwrap(), 6);

        engine.admin_reset().await.unwrap();

        assert_eq!(store.get("1").await.unwrap(), 10);
        assert_eq!(ledger.count("1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let (engine, _, _) = engine();
        engine.bootstrap(courses()).await.unwrap();
        engine.reserve("2", "alice").await;

        engine.admin_reset().await.unwrap();
        let once = engine.get_status().await.unwrap();
        engine.admin_reset().await.unwrap();
        let twice = engine.get_status().await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.total_committed, 0);
        assert_eq!(twice.remaining.get("2"), Some(&3));
    }

    #[tokio::test]
    async fn reservations_resume_after_reset() {
        let (engine, _, _) = engine();
        engine.bootstrap(courses()).await.unwrap();
        engine.admin_reset().await.unwrap();

        assert!(engine.reserve("2", "alice").await.is_granted());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn counter_and_ledger_agree_at_quiescence() {
        let (engine, store, ledger) = engine();
        let engine = Arc::new(engine);
        engine.bootstrap(courses()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..40 {
            let e = engine.clone();
            let offering = if i % 2 == 0 { "1" } else { "2" };
            handles.push(tokio::spawn(async move {
                e.reserve(offering, &format!("user-{i}")).await
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        for offering in courses() {
            let committed = ledger.count(&offering.id).await.unwrap();
            assert!(committed <= offering.capacity as u64);
            assert_eq!(
                store.get(&offering.id).await.unwrap(),
                offering.capacity - committed as i64
            );
        }
        let status = engine.get_status().await.unwrap();
        assert_eq!(status.total_committed, 13);
    }

    #[tokio::test]
    async fn dropped_caller_does_not_abandon_attempt() {
        let (engine, store, ledger) = engine();
        let engine = Arc::new(engine);
        engine.bootstrap(courses()).await.unwrap();

        let e = engine.clone();
        let caller = tokio::spawn(async move { e.reserve("2", "alice").await });
        caller.abort();
        let _ = caller.await;

        // give a detached attempt (if any started) time to finish
        tokio::time::sleep(Duration::from_millis(50)).await;
        let committed = ledger.count("2").await.unwrap();
        assert_eq!(store.get("2").await.unwrap(), 3 - committed as i64);
    }

    #[tokio::test]
    async fn offering_statuses_report_live_numbers() {
        let (engine, _, _) = engine();
        engine.bootstrap(courses()).await.unwrap();
        engine.reserve("2", "alice").await;

        let statuses = engine.offering_statuses().await.unwrap();
        assert_eq!(statuses.len(), 2);
        let second = &statuses[1];
        assert_eq!(second.offering.id, "2");
        assert_eq!(second.remaining, 2);
        assert_eq!(second.committed, 1);
        assert!(second.ready);
    }
}
