//! Menu item entity - Represents a dish or drink that can be ordered.
//!
//! Menu items are never hard-deleted: order lines keep referencing them, so removal
//! only sets `is_deleted` and the row can later be restored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    /// Unique identifier for the menu item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name shown on the menu (e.g. "Buffalo Wings")
    pub name: String,
    /// Unicode-lowercased copy of `name`, matched by menu search
    #[serde(skip)]
    pub search_name: String,
    /// Longer description shown on the detail page
    pub description: String,
    /// Current unit price
    pub price: f64,
    /// Quantity on hand
    pub quantity: i32,
    /// ID of the category this item is listed under
    pub category_id: i64,
    /// Optional image location (URL or static path)
    pub image_url: Option<String>,
    /// Whether the item can currently be ordered
    pub is_available: bool,
    /// Soft delete flag - if true, item is hidden but data is preserved
    pub is_deleted: bool,
    /// Preparation time in minutes
    pub preparation_time: i32,
    /// When the item was created
    pub created_at: DateTime,
    /// When the item was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `MenuItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each menu item belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// One menu item appears in many order lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
