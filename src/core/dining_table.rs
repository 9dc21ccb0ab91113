//! Dining table business logic.

use crate::{
    core::repository,
    entities::{DiningTable, Reservation, dining_table, reservation},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{info, instrument};

const ENTITY: &str = "table";

/// Fields an administrator supplies when creating or editing a table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableInput {
    /// Table number, unique
    pub number: i32,
    /// Maximum guests
    pub capacity: i32,
    /// Location label
    #[serde(default)]
    pub location: String,
    /// Whether the table can be reserved
    #[serde(default = "default_available")]
    pub is_available: bool,
}

const fn default_available() -> bool {
    true
}

fn validate(input: &TableInput) -> Result<()> {
    if input.number < 1 {
        return Err(Error::invalid_argument("Table number must be positive"));
    }
    if input.capacity < 1 {
        return Err(Error::invalid_argument("Table capacity must be at least 1"));
    }
    Ok(())
}

fn number_taken(number: i32) -> String {
    format!("Table number {number} is already in use")
}

async fn ensure_number_free(
    db: &DatabaseConnection,
    number: i32,
    except_id: Option<i64>,
) -> Result<()> {
    let existing = DiningTable::find()
        .filter(dining_table::Column::Number.eq(number))
        .one(db)
        .await?;
    match existing {
        Some(table) if Some(table.id) != except_id => {
            Err(Error::invalid_operation(number_taken(number)))
        }
        _ => Ok(()),
    }
}

/// Lists all tables ordered by number, including ones marked unavailable.
///
/// This is the administrator's view of the floor plan.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_tables(db: &DatabaseConnection) -> Result<Vec<dining_table::Model>> {
    DiningTable::find()
        .order_by_asc(dining_table::Column::Number)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists reservable tables that seat at least `min_capacity` guests, smallest first.
///
/// Ties on capacity are broken by table number. Customers pick a table from this
/// list when making a reservation.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_available_tables(
    db: &DatabaseConnection,
    min_capacity: i32,
) -> Result<Vec<dining_table::Model>> {
    DiningTable::find()
        .filter(dining_table::Column::IsAvailable.eq(true))
        .filter(dining_table::Column::Capacity.gte(min_capacity))
        .order_by_asc(dining_table::Column::Capacity)
        .order_by_asc(dining_table::Column::Number)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a table by id.
///
/// # Errors
/// Returns [`Error::NotFound`] if no table has this id.
pub async fn get_table(db: &DatabaseConnection, table_id: i64) -> Result<dining_table::Model> {
    repository::get_by_id::<DiningTable, _>(db, ENTITY, table_id).await
}

/// Creates a table.
///
/// # Errors
/// Returns an error if the number or capacity is not positive, or the number is taken.
#[instrument(skip(db))]
pub async fn create_table(
    db: &DatabaseConnection,
    input: &TableInput,
) -> Result<dining_table::Model> {
    validate(input)?;
    ensure_number_free(db, input.number, None).await?;

    let created = dining_table::ActiveModel {
        number: Set(input.number),
        capacity: Set(input.capacity),
        location: Set(input.location.trim().to_string()),
        is_available: Set(input.is_available),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| repository::conflict_on_unique(err, || number_taken(input.number)))?;

    info!(table_id = created.id, number = created.number, "Created table");
    Ok(created)
}

/// Replaces the fields of an existing table.
///
/// # Errors
/// Returns an error if validation fails, the table does not exist, or the new number
/// belongs to another table.
#[instrument(skip(db))]
pub async fn update_table(
    db: &DatabaseConnection,
    table_id: i64,
    input: &TableInput,
) -> Result<dining_table::Model> {
    validate(input)?;
    let existing = get_table(db, table_id).await?;
    ensure_number_free(db, input.number, Some(table_id)).await?;

    let mut active: dining_table::ActiveModel = existing.into();
    active.number = Set(input.number);
    active.capacity = Set(input.capacity);
    active.location = Set(input.location.trim().to_string());
    active.is_available = Set(input.is_available);
    active
        .update(db)
        .await
        .map_err(|err| repository::conflict_on_unique(err, || number_taken(input.number)))
}

/// Deletes a table that no active reservation points at.
///
/// # Errors
/// Returns [`Error::NotFound`] if the table does not exist and
/// [`Error::InvalidOperation`] while non-canceled reservations reference it.
#[instrument(skip(db))]
pub async fn delete_table(db: &DatabaseConnection, table_id: i64) -> Result<()> {
    let table = get_table(db, table_id).await?;

    let active_reservations = Reservation::find()
        .filter(reservation::Column::TableId.eq(table_id))
        .filter(reservation::Column::IsCanceled.eq(false))
        .count(db)
        .await?;
    if active_reservations > 0 {
        return Err(Error::invalid_operation(format!(
            "Table {} has {active_reservations} active reservation(s)",
            table.number
        )));
    }

    // Canceled reservations keep their history without the table link
    Reservation::update_many()
        .col_expr(reservation::Column::TableId, Expr::value(Option::<i64>::None))
        .filter(reservation::Column::TableId.eq(table_id))
        .exec(db)
        .await?;

    repository::delete_by_id::<DiningTable, _>(db, ENTITY, table_id).await?;
    info!(table_id, "Deleted table {}", table.number);
    Ok(())
}
