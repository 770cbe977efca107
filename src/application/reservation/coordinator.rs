//! Reservation coordinator
//!
//! One attempt is `PENDING -> {GRANTED, REJECTED}`:
//!
//! 1. unconditional atomic decrement of the offering's counter
//! 2. negative result: compensate, `SOLD_OUT`
//! 3. otherwise append to the ledger; on failure compensate and reject
//!
//! Every rejected attempt whose decrement applied issues exactly one
//! compensating increment before returning, so at any instant the units
//! consumed by pending or granted attempts never exceed capacity.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::outcome::{RejectReason, ReserveOutcome};
use crate::application::reconciliation::ReadinessGates;
use crate::domain::{DomainError, OrderLedger, SlotStore};
use crate::shared::retry::{retry_with_backoff, RetryConfig};

pub struct ReservationCoordinator {
    store: Arc<dyn SlotStore>,
    ledger: Arc<dyn OrderLedger>,
    gates: Arc<ReadinessGates>,
    compensation_retry: RetryConfig,
}

impl ReservationCoordinator {
    pub fn new(
        store: Arc<dyn SlotStore>,
        ledger: Arc<dyn OrderLedger>,
        gates: Arc<ReadinessGates>,
        compensation_retry: RetryConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            gates,
            compensation_retry,
        }
    }

    /// Run one attempt to completion. Never returns with a decrement that is
    /// neither committed to the ledger nor compensated (short of the
    /// compensation retry budget running out, which is logged and counted).
    pub async fn reserve(&self, offering_id: &str, requester_id: &str) -> ReserveOutcome {
        let started = Instant::now();
        let outcome = self.attempt(offering_id, requester_id).await;

        metrics::histogram!("reservation_duration_seconds").record(started.elapsed().as_secs_f64());
        match &outcome {
            ReserveOutcome::Granted { .. } => {
                metrics::counter!("reservations_granted_total").increment(1);
            }
            ReserveOutcome::Rejected { reason } => {
                metrics::counter!("reservations_rejected_total", "reason" => reason.as_str())
                    .increment(1);
            }
        }
        outcome
    }

    async fn attempt(&self, offering_id: &str, requester_id: &str) -> ReserveOutcome {
        let _permit = match self.gates.admit(offering_id) {
            Ok(permit) => permit,
            Err(DomainError::NotReady(_)) => {
                debug!(offering_id, requester_id, "Offering under reconciliation");
                return ReserveOutcome::rejected(RejectReason::NotReady);
            }
            Err(e) => {
                error!(offering_id, error = %e, "Reservation for unregistered offering");
                return ReserveOutcome::rejected(RejectReason::NotFound);
            }
        };

        let remaining = match self.store.try_decrement(offering_id).await {
            Ok(remaining) => remaining,
            Err(e @ DomainError::NotFound { .. }) => {
                error!(offering_id, error = %e, "Slot counter missing for registered offering");
                return ReserveOutcome::rejected(RejectReason::NotFound);
            }
            Err(e) => {
                // the decrement is assumed not applied
                warn!(offering_id, requester_id, error = %e, "Slot counter unavailable");
                return ReserveOutcome::rejected(RejectReason::PersistenceFailure);
            }
        };

        if remaining < 0 {
            self.compensate(offering_id).await;
            debug!(offering_id, requester_id, "Sold out");
            return ReserveOutcome::rejected(RejectReason::SoldOut);
        }

        match self.ledger.append(offering_id, requester_id).await {
            Ok(reservation_id) => {
                info!(offering_id, requester_id, %reservation_id, remaining, "Slot granted");
                ReserveOutcome::Granted {
                    reservation_id,
                    remaining,
                }
            }
            Err(DomainError::Conflict(msg)) => {
                self.compensate(offering_id).await;
                info!(offering_id, requester_id, reason = %msg, "Duplicate reservation rejected");
                ReserveOutcome::rejected(RejectReason::Duplicate)
            }
            Err(e) => {
                self.compensate(offering_id).await;
                warn!(offering_id, requester_id, error = %e, "Ledger append failed, slot returned");
                ReserveOutcome::rejected(RejectReason::PersistenceFailure)
            }
        }
    }

    /// Undo this attempt's decrement with at most one applied increment.
    ///
    /// `INCR` is not idempotent, so only failures known not to have reached
    /// the store are retried. An ambiguous failure (lost reply) is left as
    /// drift: the counter can only under-report, never oversell.
    async fn compensate(&self, offering_id: &str) {
        let result = retry_with_backoff(
            &self.compensation_retry,
            || self.store.increment(offering_id),
            DomainError::is_unapplied,
            "slot_compensation",
        )
        .await;

        match result {
            Ok(_) => metrics::counter!("slot_compensations_total").increment(1),
            Err(e) => {
                // counter may under-report by one until the next reconciliation
                metrics::counter!("slot_compensation_failures_total").increment(1);
                error!(offering_id, error = %e, "Compensating increment failed; inventory drifted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    use crate::application::testing::{CountingSlotStore, FailingLedger};
    use crate::infrastructure::InMemoryOrderLedger;

    struct Fixture {
        store: Arc<CountingSlotStore>,
        ledger: Arc<FailingLedger>,
        gates: Arc<ReadinessGates>,
        coordinator: Arc<ReservationCoordinator>,
    }

    async fn fixture(capacity: i64, enforce_unique: bool) -> Fixture {
        let store = Arc::new(CountingSlotStore::new());
        let ledger = Arc::new(FailingLedger::new(InMemoryOrderLedger::new(enforce_unique)));
        let gates = Arc::new(ReadinessGates::new());

        store.set_baseline("1", capacity).await.unwrap();
        gates.exclusive("1").await.complete();

        let retry = RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(2),
        };
        let coordinator = Arc::new(ReservationCoordinator::new(
            store.clone(),
            ledger.clone(),
            gates.clone(),
            retry,
        ));
        Fixture {
            store,
            ledger,
            gates,
            coordinator,
        }
    }

    #[tokio::test]
    async fn grants_and_reports_remaining() {
        let f = fixture(2, false).await;

        let outcome = f.coordinator.reserve("1", "alice").await;
        match outcome {
            ReserveOutcome::Granted { remaining, .. } => assert_eq!(remaining, 1),
            other => panic!("expected grant, got {other:?}"),
        }
        assert_eq!(f.ledger.count("1").await.unwrap(), 1);
        assert_eq!(f.store.increments(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn exact_exhaustion_under_concurrency() {
        let f = fixture(3, false).await;

        let mut handles = Vec::new();
        for i in 0..5 {
            let c = f.coordinator.clone();
            handles.push(tokio::spawn(async move {
                c.reserve("1", &format!("user-{i}")).await
            }));
        }
        let mut outcomes = Vec::new();
        for h in handles {
            outcomes.push(h.await.unwrap());
        }

        let ids: HashSet<&str> = outcomes.iter().filter_map(|o| o.reservation_id()).collect();
        let sold_out = outcomes
            .iter()
            .filter(|o| o.reason() == Some(RejectReason::SoldOut))
            .count();

        assert_eq!(ids.len(), 3);
        assert_eq!(sold_out, 2);
        assert_eq!(f.store.get("1").await.unwrap(), 0);
        assert_eq!(f.ledger.count("1").await.unwrap(), 3);
        // one compensation per sold-out attempt
        assert_eq!(f.store.increments(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn never_oversells_under_heavy_contention() {
        let f = fixture(25, false).await;

        let mut handles = Vec::new();
        for i in 0..200 {
            let c = f.coordinator.clone();
            handles.push(tokio::spawn(async move {
                c.reserve("1", &format!("user-{i}")).await
            }));
        }
        let mut granted = 0;
        for h in handles {
            if h.await.unwrap().is_granted() {
                granted += 1;
            }
        }

        assert_eq!(granted, 25);
        assert_eq!(f.ledger.count("1").await.unwrap(), 25);
        // counter and ledger agree at quiescence
        assert_eq!(f.store.get("1").await.unwrap(), 25 - 25);
        assert_eq!(f.store.increments(), 175);
    }

    #[tokio::test]
    async fn ledger_failure_is_compensated() {
        let f = fixture(5, false).await;
        f.ledger.fail_next_appends(1);

        let before = f.store.get("1").await.unwrap();
        let outcome = f.coordinator.reserve("1", "alice").await;

        assert_eq!(outcome.reason(), Some(RejectReason::PersistenceFailure));
        assert_eq!(f.store.get("1").await.unwrap(), before);
        assert_eq!(f.store.increments(), 1);
        assert_eq!(f.ledger.count("1").await.unwrap(), 0);

        // next attempt goes through
        assert!(f.coordinator.reserve("1", "alice").await.is_granted());
        assert_eq!(f.store.get("1").await.unwrap(), before - 1);
    }

    #[tokio::test]
    async fn sold_out_leaves_counter_at_zero() {
        let f = fixture(0, false).await;

        let outcome = f.coordinator.reserve("1", "alice").await;
        assert_eq!(outcome.reason(), Some(RejectReason::SoldOut));
        assert_eq!(f.store.get("1").await.unwrap(), 0);
        assert_eq!(f.ledger.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_is_compensated_when_uniqueness_enforced() {
        let f = fixture(5, true).await;

        assert!(f.coordinator.reserve("1", "alice").await.is_granted());
        let outcome = f.coordinator.reserve("1", "alice").await;

        assert_eq!(outcome.reason(), Some(RejectReason::Duplicate));
        assert_eq!(f.store.get("1").await.unwrap(), 4);
        assert_eq!(f.ledger.count("1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_offering_is_not_found_without_compensation() {
        let f = fixture(5, false).await;

        let outcome = f.coordinator.reserve("404", "alice").await;
        assert_eq!(outcome.reason(), Some(RejectReason::NotFound));
        assert_eq!(f.store.increments(), 0);
    }

    #[tokio::test]
    async fn not_ready_during_reconciliation() {
        let f = fixture(5, false).await;

        let permit = f.gates.exclusive("1").await;
        let outcome = f.coordinator.reserve("1", "alice").await;
        assert_eq!(outcome.reason(), Some(RejectReason::NotReady));
        // counter untouched
        assert_eq!(f.store.get("1").await.unwrap(), 5);

        permit.complete();
        assert!(f.coordinator.reserve("1", "alice").await.is_granted());
    }

    #[tokio::test]
    async fn undelivered_compensation_is_retried() {
        let f = fixture(5, false).await;
        f.ledger.fail_next_appends(1);
        f.store.fail_next_increments(2);

        let outcome = f.coordinator.reserve("1", "alice").await;

        assert_eq!(outcome.reason(), Some(RejectReason::PersistenceFailure));
        assert_eq!(f.store.get("1").await.unwrap(), 5);
        assert_eq!(f.store.increments(), 1);
    }

    #[tokio::test]
    async fn lost_increment_reply_is_not_repeated() {
        let f = fixture(1, false).await;
        f.ledger.fail_next_appends(1);
        f.store.lose_next_increment_replies(1);

        let outcome = f.coordinator.reserve("1", "alice").await;
        assert_eq!(outcome.reason(), Some(RejectReason::PersistenceFailure));
        // the increment landed once even though its reply was lost
        assert_eq!(f.store.get("1").await.unwrap(), 1);
        assert_eq!(f.store.increments(), 1);

        let mut granted = 0;
        for i in 0..5 {
            if f.coordinator.reserve("1", &format!("user-{i}")).await.is_granted() {
                granted += 1;
            }
        }
        assert_eq!(granted, 1);
        assert_eq!(f.ledger.count("1").await.unwrap(), 1);
        assert_eq!(f.store.get("1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn exhausted_compensation_budget_still_rejects() {
        let f = fixture(5, false).await;
        f.ledger.fail_next_appends(1);
        f.store.fail_next_increments(10);

        let outcome = f.coordinator.reserve("1", "alice").await;

        assert_eq!(outcome.reason(), Some(RejectReason::PersistenceFailure));
        // drift of one slot, repaired by the next reconciliation
        assert_eq!(f.store.get("1").await.unwrap(), 4);
        assert_eq!(f.store.increments(), 0);
    }
}
