//! SeaORM implementation of the order ledger

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};
use tracing::debug;

use crate::domain::{DomainError, DomainResult, OrderLedger, Reservation, ReservationStatus};
use crate::infrastructure::database::entities::reservation;
use crate::shared::errors::InfraError;

pub struct SeaOrmOrderLedger {
    db: DatabaseConnection,
    enforce_unique_requester: bool,
}

impl SeaOrmOrderLedger {
    pub fn new(db: DatabaseConnection, enforce_unique_requester: bool) -> Self {
        Self {
            db,
            enforce_unique_requester,
        }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> Reservation {
    Reservation {
        id: m.id,
        offering_id: m.offering_id,
        requester_id: m.requester_id,
        // only COMMITTED rows are ever written
        status: ReservationStatus::parse(&m.status).unwrap_or(ReservationStatus::Committed),
        created_at: m.created_at,
    }
}

fn holder_key(offering_id: &str, requester_id: &str) -> String {
    format!("{offering_id}:{requester_id}")
}

fn append_err(e: DbErr, offering_id: &str, requester_id: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(format!(
            "requester {requester_id} already holds a slot of offering {offering_id}"
        )),
        _ => InfraError::from(e).into(),
    }
}

// ── OrderLedger impl ────────────────────────────────────────────

#[async_trait]
impl OrderLedger for SeaOrmOrderLedger {
    async fn append(&self, offering_id: &str, requester_id: &str) -> DomainResult<String> {
        let r = Reservation::commit(offering_id, requester_id);
        debug!(reservation_id = %r.id, offering_id, requester_id, "Appending reservation");

        let model = reservation::ActiveModel {
            id: Set(r.id.clone()),
            offering_id: Set(r.offering_id),
            requester_id: Set(r.requester_id),
            status: Set(r.status.as_str().to_string()),
            holder_key: Set(self
                .enforce_unique_requester
                .then(|| holder_key(offering_id, requester_id))),
            created_at: Set(r.created_at),
        };
        // single-row insert: the record is either fully there or absent
        reservation::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| append_err(e, offering_id, requester_id))?;
        Ok(r.id)
    }

    async fn count(&self, offering_id: &str) -> DomainResult<u64> {
        let n = reservation::Entity::find()
            .filter(reservation::Column::OfferingId.eq(offering_id))
            .count(&self.db)
            .await
            .map_err(InfraError::from)?;
        Ok(n)
    }

    async fn count_all(&self) -> DomainResult<u64> {
        let n = reservation::Entity::find()
            .count(&self.db)
            .await
            .map_err(InfraError::from)?;
        Ok(n)
    }

    async fn list_recent(&self, limit: u64) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_desc(reservation::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(InfraError::from)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn clear(&self) -> DomainResult<()> {
        let res = reservation::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(InfraError::from)?;
        debug!(deleted = res.rows_affected, "Cleared order ledger");
        Ok(())
    }
}
