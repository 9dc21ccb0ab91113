//! Profile endpoints for the calling user.

use crate::{
    api::{AppState, auth::CurrentUser, extract::Json},
    core::user::{self, ProfileInput, UserWithRoles},
    errors::Result,
};
use axum::{Router, extract::State, routing::get};

/// Routes under `/api/users`.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/users/me", get(get_me).put(update_me))
}

/// GET /api/users/me
async fn get_me(State(state): State<AppState>, caller: CurrentUser) -> Result<Json<UserWithRoles>> {
    let profile = user::get_user(&state.db, &caller.id).await?;
    Ok(Json(UserWithRoles {
        user: profile,
        roles: caller.roles,
    }))
}

/// PUT /api/users/me - creates the profile on first call
///
/// Without a `display_name` in the body, the gateway's `x-user-name` is used.
async fn update_me(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(mut input): Json<ProfileInput>,
) -> Result<Json<UserWithRoles>> {
    if input.display_name.is_none() {
        input.display_name = caller.display_name;
    }
    let profile = user::upsert_user(&state.db, &caller.id, &input).await?;
    Ok(Json(UserWithRoles {
        user: profile,
        roles: caller.roles,
    }))
}
