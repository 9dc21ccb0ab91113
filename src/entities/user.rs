//! User entity - Local profile of an identity managed by the upstream
//! authentication provider. Credentials are never stored here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Identity subject forwarded by the authentication layer
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Name shown to staff
    pub display_name: String,
    /// Contact address, if the identity provider shared one
    pub email: Option<String>,
    /// When the profile was first seen
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many role memberships
    #[sea_orm(has_many = "super::user_role::Entity")]
    Roles,
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Roles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
