//! Order entity - A user's cart (`Draft`) or a finalized order.
//!
//! `status` is stored as text; see [`crate::core::order::OrderStatus`] for the
//! allowed values and transitions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity subject of the user who owns the order
    pub user_id: String,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// `"Draft"`, `"Completed"` or `"Canceled"`
    pub status: String,
    /// Sum of quantity x snapshotted price over the order lines
    pub total: f64,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
