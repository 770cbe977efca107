//! Reservation domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Reservation status.
///
/// Failed attempts are never persisted, so `Committed` is the only state a
/// ledger entry can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Committed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed => "COMMITTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "COMMITTED" => Some(Self::Committed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A granted slot, as recorded in the order ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    /// Ticket identifier handed back to the buyer
    pub id: String,
    pub offering_id: String,
    pub requester_id: String,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Build a new committed reservation with a freshly generated ticket id.
    pub fn commit(offering_id: impl Into<String>, requester_id: impl Into<String>) -> Self {
        Self {
            id: new_ticket_id(),
            offering_id: offering_id.into(),
            requester_id: requester_id.into(),
            status: ReservationStatus::Committed,
            created_at: Utc::now(),
        }
    }
}

/// `TICKET-<uuid>`; unique across concurrent commits, unlike a timestamp.
pub fn new_ticket_id() -> String {
    format!("TICKET-{}", Uuid::new_v4().simple().to_string().to_uppercase())
}
