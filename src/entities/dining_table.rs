//! Dining table entity - A physical table that reservations can be assigned to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dining table database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dining_tables")]
pub struct Model {
    /// Unique identifier for the table
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Table number as printed on the floor plan
    #[sea_orm(unique)]
    pub number: i32,
    /// Maximum number of guests
    pub capacity: i32,
    /// Free-form location (e.g. "patio", "bar", "main hall")
    pub location: String,
    /// Whether the table can currently be reserved
    pub is_available: bool,
}

/// Defines relationships between `DiningTable` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One table has many reservations
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
