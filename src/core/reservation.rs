//! Reservation business logic - Booking, editing and cancelling table reservations.
//!
//! Reservation times are exchanged as `dd-mm-YYYY HH:MM` text and stored as a
//! structured date-time. Parsing is strict: the input must be exactly what formatting
//! the parsed value would produce, so impossible dates and unpadded fields are rejected
//! rather than silently adjusted. Cancelling only sets a flag; the row stays for
//! auditing.

use crate::{
    core::repository,
    entities::{DiningTable, Reservation, reservation},
    errors::{Error, Result},
};
use chrono::NaiveDateTime;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Text format of reservation times at the API boundary.
pub const RESERVATION_DATE_FORMAT: &str = "%d-%m-%Y %H:%M";

const ENTITY: &str = "reservation";

/// Parses a `dd-mm-YYYY HH:MM` reservation time.
///
/// # Errors
/// Returns [`Error::InvalidDate`] if the text is not a real calendar date-time in
/// exactly that format.
pub fn parse_reservation_date(input: &str) -> Result<NaiveDateTime> {
    let invalid = || Error::InvalidDate {
        input: input.to_string(),
    };

    let parsed =
        NaiveDateTime::parse_from_str(input, RESERVATION_DATE_FORMAT).map_err(|_| invalid())?;

    if format_reservation_date(parsed) != input {
        return Err(invalid());
    }
    Ok(parsed)
}

/// Formats a stored reservation time as `dd-mm-YYYY HH:MM`.
#[must_use]
pub fn format_reservation_date(value: NaiveDateTime) -> String {
    value.format(RESERVATION_DATE_FORMAT).to_string()
}

/// Fields a user supplies when booking or editing a reservation.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationInput {
    /// `dd-mm-YYYY HH:MM`
    pub date: String,
    /// Table to reserve, if the guest picked one
    #[serde(default)]
    pub table_id: Option<i64>,
    /// Outdoor seating requested
    #[serde(default)]
    pub is_outdoor: bool,
    /// Number of guests
    pub guests: i32,
}

/// Validates the input against the referenced table and returns the parsed time.
async fn validate(db: &DatabaseConnection, input: &ReservationInput) -> Result<NaiveDateTime> {
    let reserved_at = parse_reservation_date(&input.date)?;

    if input.guests < 1 {
        return Err(Error::invalid_argument("A reservation needs at least one guest"));
    }

    if let Some(table_id) = input.table_id {
        let table = repository::get_by_id::<DiningTable, _>(db, "table", table_id).await?;
        if !table.is_available {
            return Err(Error::invalid_operation(format!(
                "Table {} is not available for reservations",
                table.number
            )));
        }
        if table.capacity < input.guests {
            return Err(Error::invalid_operation(format!(
                "Table {} seats {} but {} guests were requested",
                table.number, table.capacity, input.guests
            )));
        }
    }

    Ok(reserved_at)
}

/// Books a reservation for a user.
///
/// # Errors
/// Returns an error if:
/// - The date is not a valid `dd-mm-YYYY HH:MM` value
/// - Fewer than one guest is requested
/// - The table does not exist, is unavailable, or is too small
/// - The database insert fails
#[instrument(skip(db, input), fields(date = %input.date))]
pub async fn create_reservation(
    db: &DatabaseConnection,
    user_id: &str,
    input: &ReservationInput,
) -> Result<reservation::Model> {
    let reserved_at = validate(db, input).await?;

    let created = reservation::ActiveModel {
        user_id: Set(user_id.to_string()),
        reserved_at: Set(reserved_at),
        table_id: Set(input.table_id),
        is_outdoor: Set(input.is_outdoor),
        guests: Set(input.guests),
        is_canceled: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(reservation_id = created.id, user_id, "Created reservation");
    Ok(created)
}

/// Retrieves a reservation by id, canceled or not.
///
/// # Errors
/// Returns [`Error::NotFound`] if no reservation has this id.
pub async fn get_reservation(
    db: &DatabaseConnection,
    reservation_id: i64,
) -> Result<reservation::Model> {
    repository::get_by_id::<Reservation, _>(db, ENTITY, reservation_id).await
}

/// Lists a user's reservations, soonest first.
///
/// Canceled reservations are included so the user can see their history.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_reservations_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<reservation::Model>> {
    Reservation::find()
        .filter(reservation::Column::UserId.eq(user_id))
        .order_by_asc(reservation::Column::ReservedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every reservation, soonest first.
///
/// Backs the staff reservation overview and includes canceled reservations.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_all_reservations(db: &DatabaseConnection) -> Result<Vec<reservation::Model>> {
    Reservation::find()
        .order_by_asc(reservation::Column::ReservedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the date, table, seating and guest count of an active reservation.
///
/// # Errors
/// Returns an error if validation fails, the reservation does not exist, or it has
/// been canceled.
#[instrument(skip(db, input))]
pub async fn update_reservation(
    db: &DatabaseConnection,
    reservation_id: i64,
    input: &ReservationInput,
) -> Result<reservation::Model> {
    let existing = get_reservation(db, reservation_id).await?;
    if existing.is_canceled {
        return Err(Error::invalid_operation(format!(
            "Reservation {reservation_id} is canceled"
        )));
    }

    let reserved_at = validate(db, input).await?;

    let mut active: reservation::ActiveModel = existing.into();
    active.reserved_at = Set(reserved_at);
    active.table_id = Set(input.table_id);
    active.is_outdoor = Set(input.is_outdoor);
    active.guests = Set(input.guests);
    active.update(db).await.map_err(Into::into)
}

/// Marks a reservation as canceled. Cancelling twice is a no-op.
///
/// # Errors
/// Returns [`Error::NotFound`] if the reservation does not exist.
#[instrument(skip(db))]
pub async fn cancel_reservation(
    db: &DatabaseConnection,
    reservation_id: i64,
) -> Result<reservation::Model> {
    let existing = get_reservation(db, reservation_id).await?;
    if existing.is_canceled {
        return Ok(existing);
    }

    let mut active: reservation::ActiveModel = existing.into();
    active.is_canceled = Set(true);
    let canceled = active.update(db).await?;

    info!(reservation_id, "Canceled reservation");
    Ok(canceled)
}
