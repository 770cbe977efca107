use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    /// The write may or may not have been applied (lost reply, timeout).
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The request never reached storage (connection refused), so it was
    /// certainly not applied.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Offering {0} is not ready (reconciliation in progress)")]
    NotReady(String),
}

impl DomainError {
    /// Shorthand for the most common lookup failure.
    pub fn offering_not_found(offering_id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity: "Offering",
            field: "id",
            value: offering_id.into(),
        }
    }

    /// Whether the caller may succeed by trying again shortly.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::PersistenceFailure(_)
                | DomainError::Unavailable(_)
                | DomainError::NotReady(_)
        )
    }

    /// Whether a failed write is known to have had no effect. Only these are
    /// safe to repeat for non-idempotent operations such as `INCR`.
    pub fn is_unapplied(&self) -> bool {
        matches!(self, DomainError::Unavailable(_))
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        match &e {
            InfraError::Redis(re) if re.is_connection_refusal() => {
                DomainError::Unavailable(e.to_string())
            }
            _ => DomainError::PersistenceFailure(e.to_string()),
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
