//! Offering repository interface

use async_trait::async_trait;

use super::model::Offering;
use crate::domain::DomainResult;

/// Catalog of offerings. Capacity is the reconciliation baseline, so only
/// provisioning writes it.
#[async_trait]
pub trait OfferingRepository: Send + Sync {
    /// All offerings, ordered by id
    async fn list(&self) -> DomainResult<Vec<Offering>>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Offering>>;

    /// Insert or replace title/price/capacity of an offering
    async fn upsert(&self, offering: Offering) -> DomainResult<()>;
}
