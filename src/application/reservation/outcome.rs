//! Result of one reservation attempt

use serde::Serialize;

/// Why an attempt did not end in a granted slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// No slots left. Expected under load, not an error.
    SoldOut,
    /// The ledger write failed after the decrement; compensated.
    PersistenceFailure,
    /// Unknown offering: a configuration defect.
    NotFound,
    /// Offering under reconciliation.
    NotReady,
    /// Requester already holds a slot of this offering; compensated.
    Duplicate,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SoldOut => "SOLD_OUT",
            Self::PersistenceFailure => "PERSISTENCE_FAILURE",
            Self::NotFound => "NOT_FOUND",
            Self::NotReady => "NOT_READY",
            Self::Duplicate => "DUPLICATE",
        }
    }

    /// Whether the same request may succeed if sent again shortly.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PersistenceFailure | Self::NotReady)
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    Granted {
        reservation_id: String,
        /// Slots left right after this grant
        remaining: i64,
    },
    Rejected { reason: RejectReason },
}

impl ReserveOutcome {
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected { reason }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    pub fn reservation_id(&self) -> Option<&str> {
        match self {
            Self::Granted { reservation_id, .. } => Some(reservation_id),
            Self::Rejected { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Granted { .. } => None,
            Self::Rejected { reason } => Some(*reason),
        }
    }
}
