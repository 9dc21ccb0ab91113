//! Bootstrap administrator configuration.
//!
//! Role memberships are managed through the admin endpoints, which themselves
//! require an administrator. `ADMIN_USER_ID` names the identity that is granted
//! the `Admin` role at startup so the first administrator can log in.

/// Gets the identity subject configured as the bootstrap administrator.
///
/// Returns `None` when `ADMIN_USER_ID` is unset or blank.
#[must_use]
pub fn bootstrap_admin_id() -> Option<String> {
    std::env::var("ADMIN_USER_ID")
        .ok()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Display name recorded for the bootstrap administrator profile.
#[must_use]
pub fn bootstrap_admin_name() -> String {
    std::env::var("ADMIN_DISPLAY_NAME").unwrap_or_else(|_| "Administrator".to_string())
}
