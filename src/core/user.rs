//! User profiles and role memberships.
//!
//! Identities are owned by the upstream authentication layer; this module only keeps
//! a local profile row per subject plus the roles granted to it.

use crate::{
    entities::{User, UserRole, user, user_role},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument};

/// Authorization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full management access
    Admin,
    /// Order and reservation handling
    Staff,
    /// Regular guest
    Customer,
}

impl Role {
    /// Text stored in `user_roles.role`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Staff => "Staff",
            Self::Customer => "Customer",
        }
    }

    /// Parses a role name, ignoring case.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for unknown roles.
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "customer" => Ok(Self::Customer),
            _ => Err(Error::invalid_argument(format!("Unknown role '{value}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user profile with the roles it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithRoles {
    /// Profile row
    #[serde(flatten)]
    pub user: user::Model,
    /// Granted roles, sorted
    pub roles: Vec<Role>,
}

/// Profile fields a user may set about themselves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    /// Display name; blank keeps the current one
    #[serde(default)]
    pub display_name: Option<String>,
    /// Contact address; blank clears it
    #[serde(default)]
    pub email: Option<String>,
}

/// Creates the profile for `user_id` or updates its provided fields.
///
/// A new profile without a display name uses the id as its name.
#[instrument(skip(db))]
pub async fn upsert_user(
    db: &DatabaseConnection,
    user_id: &str,
    profile: &ProfileInput,
) -> Result<user::Model> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(Error::invalid_argument("User id cannot be empty"));
    }

    let display_name = profile
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let email = profile.email.as_deref().map(str::trim);

    if let Some(existing) = User::find_by_id(user_id.to_string()).one(db).await? {
        let mut active: user::ActiveModel = existing.into();
        if let Some(name) = display_name {
            active.display_name = Set(name.to_string());
        }
        if let Some(email) = email {
            active.email = Set((!email.is_empty()).then(|| email.to_string()));
        }
        return active.update(db).await.map_err(Into::into);
    }

    let created = user::ActiveModel {
        id: Set(user_id.to_string()),
        display_name: Set(display_name.unwrap_or(user_id).to_string()),
        email: Set(email.filter(|e| !e.is_empty()).map(str::to_string)),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await?;

    info!(user_id, "Created user profile");
    Ok(created)
}

/// Retrieves a user profile.
///
/// # Errors
/// Returns [`Error::NotFound`] if the user has no profile.
pub async fn get_user(db: &DatabaseConnection, user_id: &str) -> Result<user::Model> {
    User::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))
}

/// Roles held by a user, sorted. Unknown role strings in the table are skipped.
///
/// A user without a profile simply has no roles. The authentication extractor
/// calls this on every request that needs the caller's roles.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn roles_for_user(db: &DatabaseConnection, user_id: &str) -> Result<Vec<Role>> {
    let memberships = UserRole::find()
        .filter(user_role::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    let mut roles: Vec<Role> = memberships
        .iter()
        .filter_map(|m| Role::parse(&m.role).ok())
        .collect();
    roles.sort();
    roles.dedup();
    Ok(roles)
}

/// Lists every profile with its roles, ordered by id.
///
/// Profiles and roles are loaded in one query through the user to role relation.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<UserWithRoles>> {
    let rows = User::find()
        .order_by_asc(user::Column::Id)
        .find_with_related(UserRole)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(user, memberships)| {
            let mut roles: Vec<Role> = memberships
                .iter()
                .filter_map(|m| Role::parse(&m.role).ok())
                .collect();
            roles.sort();
            UserWithRoles { user, roles }
        })
        .collect())
}

/// Grants a role. Granting a role the user already holds is a no-op.
///
/// # Errors
/// Returns [`Error::InvalidOperation`] if the user has no profile.
#[instrument(skip(db))]
pub async fn assign_role(db: &DatabaseConnection, user_id: &str, role: Role) -> Result<()> {
    if User::find_by_id(user_id.to_string()).one(db).await?.is_none() {
        return Err(Error::invalid_operation(format!(
            "Cannot grant {role} to unknown user '{user_id}'"
        )));
    }

    let existing = UserRole::find()
        .filter(user_role::Column::UserId.eq(user_id))
        .filter(user_role::Column::Role.eq(role.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    user_role::ActiveModel {
        user_id: Set(user_id.to_string()),
        role: Set(role.as_str().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(user_id, %role, "Granted role");
    Ok(())
}

/// Revokes a role.
///
/// # Errors
/// Returns [`Error::NotFound`] if the user does not hold the role.
#[instrument(skip(db))]
pub async fn remove_role(db: &DatabaseConnection, user_id: &str, role: Role) -> Result<()> {
    let result = UserRole::delete_many()
        .filter(user_role::Column::UserId.eq(user_id))
        .filter(user_role::Column::Role.eq(role.as_str()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("role", format!("{user_id}/{role}")));
    }
    info!(user_id, %role, "Revoked role");
    Ok(())
}
