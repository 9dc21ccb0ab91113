//! Reservation entity
//!
//! The reservation time is stored structured; the `dd-mm-YYYY HH:MM` text form only
//! exists at the HTTP boundary.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reservation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    /// Unique identifier for the reservation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity subject of the user who made the reservation
    pub user_id: String,
    /// Local date and time of the reservation
    pub reserved_at: DateTime,
    /// Optional table assigned to the reservation
    pub table_id: Option<i64>,
    /// Outdoor seating requested
    pub is_outdoor: bool,
    /// Number of guests
    pub guests: i32,
    /// Cancellation flag; canceled reservations are kept for auditing
    pub is_canceled: bool,
    /// When the reservation was made
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Reservation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reservation may be assigned to one table
    #[sea_orm(
        belongs_to = "super::dining_table::Entity",
        from = "Column::TableId",
        to = "super::dining_table::Column::Id"
    )]
    DiningTable,
}

impl Related<super::dining_table::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningTable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
