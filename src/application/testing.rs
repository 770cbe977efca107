//! Test doubles wrapping the in-memory backends with injectable failures.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use crate::domain::{DomainError, DomainResult, OrderLedger, Reservation, SlotStore};
use crate::infrastructure::{InMemoryOrderLedger, InMemorySlotStore};

/// Ledger whose next `n` appends fail with `PersistenceFailure`.
pub struct FailingLedger {
    inner: InMemoryOrderLedger,
    failing_appends: AtomicU32,
    failing_counts: AtomicBool,
}

impl FailingLedger {
    pub fn new(inner: InMemoryOrderLedger) -> Self {
        Self {
            inner,
            failing_appends: AtomicU32::new(0),
            failing_counts: AtomicBool::new(false),
        }
    }

    pub fn fail_next_appends(&self, n: u32) {
        self.failing_appends.store(n, Ordering::SeqCst);
    }

    pub fn fail_counts(&self, fail: bool) {
        self.failing_counts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderLedger for FailingLedger {
    async fn append(&self, offering_id: &str, requester_id: &str) -> DomainResult<String> {
        if take_one(&self.failing_appends) {
            return Err(DomainError::PersistenceFailure("injected append failure".into()));
        }
        self.inner.append(offering_id, requester_id).await
    }

    async fn count(&self, offering_id: &str) -> DomainResult<u64> {
        if self.failing_counts.load(Ordering::SeqCst) {
            return Err(DomainError::PersistenceFailure("injected count failure".into()));
        }
        self.inner.count(offering_id).await
    }

    async fn count_all(&self) -> DomainResult<u64> {
        self.inner.count_all().await
    }

    async fn list_recent(&self, limit: u64) -> DomainResult<Vec<Reservation>> {
        self.inner.list_recent(limit).await
    }

    async fn clear(&self) -> DomainResult<()> {
        self.inner.clear().await
    }
}

/// Slot store that records applied increments. The next `n` increments can
/// be refused before reaching the counter, or applied with the reply lost.
pub struct CountingSlotStore {
    inner: InMemorySlotStore,
    increments: AtomicU32,
    failing_increments: AtomicU32,
    lost_replies: AtomicU32,
}

impl CountingSlotStore {
    pub fn new() -> Self {
        Self {
            inner: InMemorySlotStore::new(),
            increments: AtomicU32::new(0),
            failing_increments: AtomicU32::new(0),
            lost_replies: AtomicU32::new(0),
        }
    }

    /// Increments applied to the counter so far
    pub fn increments(&self) -> u32 {
        self.increments.load(Ordering::SeqCst)
    }

    pub fn fail_next_increments(&self, n: u32) {
        self.failing_increments.store(n, Ordering::SeqCst);
    }

    pub fn lose_next_increment_replies(&self, n: u32) {
        self.lost_replies.store(n, Ordering::SeqCst);
    }
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl SlotStore for CountingSlotStore {
    async fn try_decrement(&self, offering_id: &str) -> DomainResult<i64> {
        self.inner.try_decrement(offering_id).await
    }

    async fn increment(&self, offering_id: &str) -> DomainResult<i64> {
        if take_one(&self.failing_increments) {
            return Err(DomainError::Unavailable("injected connection refusal".into()));
        }
        let value = self.inner.increment(offering_id).await?;
        self.increments.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.lost_replies) {
            return Err(DomainError::PersistenceFailure("injected lost reply".into()));
        }
        Ok(value)
    }

    async fn get(&self, offering_id: &str) -> DomainResult<i64> {
        self.inner.get(offering_id).await
    }

    async fn set_baseline(&self, offering_id: &str, value: i64) -> DomainResult<()> {
        self.inner.set_baseline(offering_id, value).await
    }
}
