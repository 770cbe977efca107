//! Slot store interface

use async_trait::async_trait;

use crate::domain::DomainResult;

/// Shared atomic counters, one per offering: the single source of truth for
/// how many slots remain right now.
///
/// Every operation on one offering's counter is linearizable with every other
/// operation on that counter. Unknown offerings yield `NotFound` (except for
/// [`set_baseline`](Self::set_baseline), which creates the counter).
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Unconditionally decrement and return the post-decrement value.
    /// A negative result means the offering was already exhausted; the
    /// caller owns undoing it.
    async fn try_decrement(&self, offering_id: &str) -> DomainResult<i64>;

    /// Increment by one. Compensation only.
    async fn increment(&self, offering_id: &str) -> DomainResult<i64>;

    /// Advisory read for status reporting, never for admission.
    async fn get(&self, offering_id: &str) -> DomainResult<i64>;

    /// Overwrite the counter. Reconciliation only.
    async fn set_baseline(&self, offering_id: &str, value: i64) -> DomainResult<()>;
}
