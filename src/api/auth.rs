//! Caller identity extractors.
//!
//! Authentication happens upstream; the gateway forwards the authenticated subject
//! in `x-user-id`. Roles are looked up in the local store on every request.

use crate::{
    api::AppState,
    core::user::{self, Role},
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, warn};

/// Header carrying the authenticated subject.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Optional header carrying a display name for the subject.
pub const USER_NAME_HEADER: &str = "x-user-name";

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Subject id
    pub id: String,
    /// Display name forwarded by the gateway
    pub display_name: Option<String>,
    /// Roles held in the local store
    pub roles: Vec<Role>,
}

impl CurrentUser {
    /// Whether the caller holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether the caller may handle other users' orders and reservations.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.has_role(Role::Admin) || self.has_role(Role::Staff)
    }

    /// Fails with [`Error::Forbidden`] unless the caller holds `role`.
    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(Error::Forbidden {
                role: role.to_string(),
            })
        }
    }

    /// Fails with [`Error::Forbidden`] unless the caller is Admin or Staff.
    pub fn require_staff(&self) -> Result<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(Error::Forbidden {
                role: "Admin or Staff".to_string(),
            })
        }
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        if let Some(user) = parts.extensions.get::<Self>() {
            return Ok(user.clone());
        }

        let Some(id) = header_value(parts, USER_ID_HEADER) else {
            warn!(uri = %parts.uri, "Request without {USER_ID_HEADER}");
            return Err(Error::Unauthorized);
        };

        let roles = user::roles_for_user(&state.db, &id).await?;
        debug!(user_id = %id, ?roles, "Resolved caller");

        let current = Self {
            id,
            display_name: header_value(parts, USER_NAME_HEADER),
            roles,
        };
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// A caller holding the Admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        user.require_role(Role::Admin)?;
        Ok(Self(user))
    }
}

/// A caller holding the Admin or Staff role.
#[derive(Debug, Clone)]
pub struct StaffUser(pub CurrentUser);

impl FromRequestParts<AppState> for StaffUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        user.require_staff()?;
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(roles: Vec<Role>) -> CurrentUser {
        CurrentUser {
            id: "u".to_string(),
            display_name: None,
            roles,
        }
    }

    #[test]
    fn test_role_checks() {
        let customer = caller(vec![Role::Customer]);
        assert!(!customer.is_staff());
        assert!(matches!(
            customer.require_role(Role::Admin),
            Err(Error::Forbidden { .. })
        ));
        assert!(customer.require_staff().is_err());

        let staff = caller(vec![Role::Staff]);
        assert!(staff.require_staff().is_ok());
        assert!(staff.require_role(Role::Admin).is_err());

        let admin = caller(vec![Role::Admin]);
        assert!(admin.require_staff().is_ok());
        assert!(admin.require_role(Role::Admin).is_ok());
    }
}
