//! Offering (course) DTOs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::{OfferingStatus, SystemStatus};

/// Catalog entry with live slot numbers
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: String,
    pub title: String,
    pub price: i64,
    pub capacity: i64,
    pub remaining: i64,
    pub committed: u64,
    /// `false` while the course is being reconciled
    pub ready: bool,
}

impl From<OfferingStatus> for CourseDto {
    fn from(s: OfferingStatus) -> Self {
        Self {
            id: s.offering.id,
            title: s.offering.title,
            price: s.offering.price,
            capacity: s.offering.capacity,
            remaining: s.remaining,
            committed: s.committed,
            ready: s.ready,
        }
    }
}

/// Remaining slots per course and total orders
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusDto {
    pub slots: BTreeMap<String, i64>,
    pub total_committed: u64,
}

impl From<SystemStatus> for StatusDto {
    fn from(s: SystemStatus) -> Self {
        Self {
            slots: s.remaining,
            total_committed: s.total_committed,
        }
    }
}
