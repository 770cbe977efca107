//! Reservation DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::Reservation;

/// Request to buy one slot of a course
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    /// Offering (course) identifier
    #[validate(length(min = 1, max = 64))]
    pub course_id: String,
    /// Requester (user) identifier
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
}

/// A granted slot
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyResponse {
    pub ticket_id: String,
    /// Slots left right after this purchase
    pub remaining: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrdersQuery {
    /// Number of orders to return (1-500). Default: 50
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    50
}

pub const MAX_ORDERS_LIMIT: u64 = 500;

/// Ledger entry in API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub ticket_id: String,
    pub course_id: String,
    pub user_id: String,
    pub status: String,
    /// RFC 3339
    pub created_at: String,
}

impl From<Reservation> for OrderDto {
    fn from(r: Reservation) -> Self {
        Self {
            ticket_id: r.id,
            course_id: r.offering_id,
            user_id: r.requester_id,
            status: r.status.to_string(),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}
