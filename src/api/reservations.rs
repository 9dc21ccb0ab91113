//! Reservation endpoints.

use crate::{
    api::{
        AppState,
        auth::CurrentUser,
        extract::{Json, Path},
    },
    core::reservation::{self, ReservationInput, format_reservation_date},
    entities::reservation as reservation_entity,
    errors::{Error, Result},
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A reservation as sent to clients, with the time in `dd-mm-YYYY HH:MM` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationResponse {
    /// Reservation id
    pub id: i64,
    /// Guest who booked
    pub user_id: String,
    /// Reserved time
    pub date: String,
    /// Reserved table, if any
    pub table_id: Option<i64>,
    /// Outdoor seating requested
    pub is_outdoor: bool,
    /// Number of guests
    pub guests: i32,
    /// Whether the reservation was canceled
    pub is_canceled: bool,
    /// When it was booked
    pub created_at: DateTime<Utc>,
}

impl From<reservation_entity::Model> for ReservationResponse {
    fn from(model: reservation_entity::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            date: format_reservation_date(model.reserved_at),
            table_id: model.table_id,
            is_outdoor: model.is_outdoor,
            guests: model.guests,
            is_canceled: model.is_canceled,
            created_at: model.created_at,
        }
    }
}

pub(crate) fn to_responses(models: Vec<reservation_entity::Model>) -> Vec<ReservationResponse> {
    models.into_iter().map(ReservationResponse::from).collect()
}

/// Reservation routes; all require a caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reservations", post(create).get(list_mine))
        .route("/api/reservations/{id}", get(get_one).put(update))
        .route("/api/reservations/{id}/cancel", post(cancel))
}

/// Loads a reservation the caller may see: their own, or any for staff.
async fn load_visible(
    state: &AppState,
    user: &CurrentUser,
    id: i64,
) -> Result<reservation_entity::Model> {
    let found = reservation::get_reservation(&state.db, id).await?;
    if found.user_id != user.id && !user.is_staff() {
        return Err(Error::not_found("reservation", id));
    }
    Ok(found)
}

/// POST /api/reservations
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<ReservationInput>,
) -> Result<(StatusCode, Json<ReservationResponse>)> {
    let created = reservation::create_reservation(&state.db, &user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /api/reservations - the caller's own reservations
async fn list_mine(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ReservationResponse>>> {
    let mine = reservation::list_reservations_for_user(&state.db, &user.id).await?;
    Ok(Json(to_responses(mine)))
}

/// GET /api/reservations/{id}
async fn get_one(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ReservationResponse>> {
    Ok(Json(load_visible(&state, &user, id).await?.into()))
}

/// PUT /api/reservations/{id}
async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<ReservationInput>,
) -> Result<Json<ReservationResponse>> {
    load_visible(&state, &user, id).await?;
    let updated = reservation::update_reservation(&state.db, id, &input).await?;
    Ok(Json(updated.into()))
}

/// POST /api/reservations/{id}/cancel
async fn cancel(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ReservationResponse>> {
    load_visible(&state, &user, id).await?;
    let canceled = reservation::cancel_reservation(&state.db, id).await?;
    Ok(Json(canceled.into()))
}
