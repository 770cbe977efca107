//! Reservation entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    /// Ticket id (`TICKET-...`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub offering_id: String,
    pub requester_id: String,

    /// Always COMMITTED
    pub status: String,

    /// `<offering_id>:<requester_id>` when one-per-requester is enforced,
    /// NULL otherwise. Covered by a unique index.
    #[sea_orm(nullable)]
    pub holder_key: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::offering::Entity",
        from = "Column::OfferingId",
        to = "super::offering::Column::Id"
    )]
    Offering,
}

impl Related<super::offering::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offering.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
