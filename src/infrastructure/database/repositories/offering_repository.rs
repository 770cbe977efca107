//! SeaORM implementation of OfferingRepository

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::debug;

use crate::domain::{DomainError, DomainResult, Offering, OfferingRepository};
use crate::infrastructure::database::entities::offering;
use crate::shared::errors::InfraError;

pub struct SeaOrmOfferingRepository {
    db: DatabaseConnection,
}

impl SeaOrmOfferingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: offering::Model) -> Offering {
    Offering {
        id: m.id,
        title: m.title,
        price: m.price,
        capacity: m.capacity,
        created_at: m.created_at,
    }
}

#[async_trait]
impl OfferingRepository for SeaOrmOfferingRepository {
    async fn list(&self) -> DomainResult<Vec<Offering>> {
        let models = offering::Entity::find()
            .order_by_asc(offering::Column::Id)
            .all(&self.db)
            .await
            .map_err(InfraError::from)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Offering>> {
        let model = offering::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(InfraError::from)?;
        Ok(model.map(model_to_domain))
    }

    async fn upsert(&self, o: Offering) -> DomainResult<()> {
        if o.capacity < 0 {
            return Err(DomainError::Validation(format!(
                "offering {} has negative capacity",
                o.id
            )));
        }
        debug!(offering_id = %o.id, capacity = o.capacity, "Upserting offering");

        let model = offering::ActiveModel {
            id: Set(o.id),
            title: Set(o.title),
            price: Set(o.price),
            capacity: Set(o.capacity),
            created_at: Set(o.created_at),
        };
        offering::Entity::insert(model)
            .on_conflict(
                OnConflict::column(offering::Column::Id)
                    .update_columns([
                        offering::Column::Title,
                        offering::Column::Price,
                        offering::Column::Capacity,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(InfraError::from)?;
        Ok(())
    }
}
