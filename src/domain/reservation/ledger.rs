//! Order ledger interface

use async_trait::async_trait;

use super::model::Reservation;
use crate::domain::DomainResult;

/// Append-only record of granted reservations; the system of record once a
/// slot is committed.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Durably persist one committed reservation and return its ticket id.
    ///
    /// The record either fully exists afterwards or not at all. Fails with
    /// `PersistenceFailure` when storage is unavailable, or `Conflict` when the
    /// requester already holds a slot of this offering and uniqueness is
    /// enforced.
    async fn append(&self, offering_id: &str, requester_id: &str) -> DomainResult<String>;

    /// Committed reservations for one offering
    async fn count(&self, offering_id: &str) -> DomainResult<u64>;

    /// Committed reservations across all offerings
    async fn count_all(&self) -> DomainResult<u64>;

    /// Most recent reservations first
    async fn list_recent(&self, limit: u64) -> DomainResult<Vec<Reservation>>;

    /// Delete every reservation. Administrative reset only.
    async fn clear(&self) -> DomainResult<()>;
}
