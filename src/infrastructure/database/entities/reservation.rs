//! Reservation entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub resource_id: String,
    pub owner_id: String,

    /// Inclusive start, whole-second UTC
    pub starts_at: DateTimeUtc,
    /// Exclusive end, whole-second UTC
    pub ends_at: DateTimeUtc,

    /// Reservation status: active
    pub status: String,

    pub created_at: DateTimeUtc,
}

// Resources are an advisory catalog; reservations carry no foreign key.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
