//! In-memory storage implementation
//!
//! Counters live in a `DashMap` of atomics, so a decrement never takes more
//! than a shard read lock. Used for single-process deployments and tests.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::{
    DomainError, DomainResult, Offering, OfferingRepository, OrderLedger, Reservation, SlotStore,
};

// ── Slot store ──────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySlotStore {
    counters: DashMap<String, AtomicI64>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn try_decrement(&self, offering_id: &str) -> DomainResult<i64> {
        let counter = self
            .counters
            .get(offering_id)
            .ok_or_else(|| DomainError::offering_not_found(offering_id))?;
        Ok(counter.fetch_sub(1, Ordering::SeqCst) - 1)
    }

    async fn increment(&self, offering_id: &str) -> DomainResult<i64> {
        let counter = self
            .counters
            .get(offering_id)
            .ok_or_else(|| DomainError::offering_not_found(offering_id))?;
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn get(&self, offering_id: &str) -> DomainResult<i64> {
        self.counters
            .get(offering_id)
            .map(|c| c.load(Ordering::SeqCst))
            .ok_or_else(|| DomainError::offering_not_found(offering_id))
    }

    async fn set_baseline(&self, offering_id: &str, value: i64) -> DomainResult<()> {
        match self.counters.entry(offering_id.to_string()) {
            Entry::Occupied(e) => e.get().store(value, Ordering::SeqCst),
            Entry::Vacant(e) => {
                e.insert(AtomicI64::new(value));
            }
        }
        Ok(())
    }
}

// ── Order ledger ────────────────────────────────────────────────

pub struct InMemoryOrderLedger {
    reservations: DashMap<String, Reservation>,
    /// (offering_id, requester_id) -> ticket id, only filled when uniqueness is enforced
    holders: DashMap<(String, String), String>,
    enforce_unique_requester: bool,
}

impl InMemoryOrderLedger {
    pub fn new(enforce_unique_requester: bool) -> Self {
        Self {
            reservations: DashMap::new(),
            holders: DashMap::new(),
            enforce_unique_requester,
        }
    }
}

impl Default for InMemoryOrderLedger {
    fn default() -> Self {
        Self::new(false)
    }
}

#[async_trait]
impl OrderLedger for InMemoryOrderLedger {
    async fn append(&self, offering_id: &str, requester_id: &str) -> DomainResult<String> {
        let reservation = Reservation::commit(offering_id, requester_id);

        if self.enforce_unique_requester {
            match self
                .holders
                .entry((offering_id.to_string(), requester_id.to_string()))
            {
                Entry::Occupied(e) => {
                    return Err(DomainError::Conflict(format!(
                        "requester {} already holds {} for offering {}",
                        requester_id,
                        e.get(),
                        offering_id
                    )));
                }
                Entry::Vacant(e) => {
                    e.insert(reservation.id.clone());
                }
            }
        }

        let id = reservation.id.clone();
        debug!(reservation_id = %id, offering_id, requester_id, "Appending reservation");
        self.reservations.insert(id.clone(), reservation);
        Ok(id)
    }

    async fn count(&self, offering_id: &str) -> DomainResult<u64> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.offering_id == offering_id)
            .count() as u64)
    }

    async fn count_all(&self) -> DomainResult<u64> {
        Ok(self.reservations.len() as u64)
    }

    async fn list_recent(&self, limit: u64) -> DomainResult<Vec<Reservation>> {
        let mut all: Vec<Reservation> = self.reservations.iter().map(|r| r.clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(all)
    }

    async fn clear(&self) -> DomainResult<()> {
        self.reservations.clear();
        self.holders.clear();
        Ok(())
    }
}

// ── Offering catalog ────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryOfferingRepository {
    offerings: DashMap<String, Offering>,
}

impl InMemoryOfferingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OfferingRepository for InMemoryOfferingRepository {
    async fn list(&self) -> DomainResult<Vec<Offering>> {
        let mut all: Vec<Offering> = self.offerings.iter().map(|o| o.clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Offering>> {
        Ok(self.offerings.get(id).map(|o| o.clone()))
    }

    async fn upsert(&self, offering: Offering) -> DomainResult<()> {
        if offering.capacity < 0 {
            return Err(DomainError::Validation(format!(
                "offering {} has negative capacity",
                offering.id
            )));
        }
        self.offerings.insert(offering.id.clone(), offering);
        Ok(())
    }
}
