//! Offering domain entity

use chrono::{DateTime, Utc};

/// One purchasable item type and its slot baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Offering {
    /// Stable identifier, also the counter key suffix
    pub id: String,
    /// Display title (catalog metadata)
    pub title: String,
    /// Display price in minor units (catalog metadata)
    pub price: i64,
    /// Number of slots granted at provisioning time
    pub capacity: i64,
    pub created_at: DateTime<Utc>,
}

impl Offering {
    pub fn new(id: impl Into<String>, title: impl Into<String>, capacity: i64, price: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            capacity,
            created_at: Utc::now(),
        }
    }

    /// Counter value for a fresh system, or one that keeps `committed`
    /// reservations from the ledger. Never negative.
    pub fn baseline(&self, committed: u64) -> i64 {
        let committed = i64::try_from(committed).unwrap_or(i64::MAX);
        self.capacity.saturating_sub(committed).max(0)
    }
}
