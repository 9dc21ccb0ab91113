//! Menu item business logic - Administration of the items listed on the menu.
//!
//! Items are soft-deleted so that order lines referencing them keep resolving; a
//! deleted item can be restored. Browsing the menu lives in [`crate::core::catalog`].

use crate::{
    core::{category, repository},
    entities::{MenuItem, menu_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

const ENTITY: &str = "menu item";

/// Fields an administrator supplies when creating or editing a menu item.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemInput {
    /// Name shown on the menu
    pub name: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Quantity on hand
    #[serde(default)]
    pub quantity: i32,
    /// Category to list the item under
    pub category_id: i64,
    /// Optional image location
    #[serde(default)]
    pub image_url: Option<String>,
    /// Whether the item can be ordered
    #[serde(default = "default_available")]
    pub is_available: bool,
    /// Preparation time in minutes
    #[serde(default)]
    pub preparation_time: i32,
}

const fn default_available() -> bool {
    true
}

/// Folded form of a name used for case-insensitive search.
///
/// `SQLite`'s `LOWER()` and `LIKE` only fold ASCII, so the folding happens here and
/// the result is stored next to the name.
#[must_use]
pub fn search_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validates the input and returns the trimmed name.
fn validate(input: &MenuItemInput) -> Result<String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::invalid_argument("Menu item name cannot be empty"));
    }

    if !input.price.is_finite() || input.price < 0.0 {
        return Err(Error::InvalidAmount {
            amount: input.price,
        });
    }

    if input.quantity < 0 {
        return Err(Error::invalid_argument("Quantity cannot be negative"));
    }

    if input.preparation_time < 0 {
        return Err(Error::invalid_argument(
            "Preparation time cannot be negative",
        ));
    }

    Ok(name.to_string())
}

fn clean_image_url(image_url: Option<&String>) -> Option<String> {
    image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Retrieves a menu item by id, including soft-deleted ones.
///
/// # Errors
/// Returns [`Error::NotFound`] if no item has this id.
pub async fn get_menu_item_any<C>(db: &C, menu_item_id: i64) -> Result<menu_item::Model>
where
    C: ConnectionTrait,
{
    repository::get_by_id::<MenuItem, _>(db, ENTITY, menu_item_id).await
}

/// Creates a new menu item.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The price is negative or not finite
/// - Quantity or preparation time is negative
/// - The category does not exist
/// - The database insert fails
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_menu_item(
    db: &DatabaseConnection,
    input: &MenuItemInput,
) -> Result<menu_item::Model> {
    let name = validate(input)?;
    category::get_category(db, input.category_id).await?;

    let now = chrono::Utc::now().naive_utc();
    let created = menu_item::ActiveModel {
        search_name: Set(search_key(&name)),
        name: Set(name),
        description: Set(input.description.trim().to_string()),
        price: Set(input.price),
        quantity: Set(input.quantity),
        category_id: Set(input.category_id),
        image_url: Set(clean_image_url(input.image_url.as_ref())),
        is_available: Set(input.is_available),
        is_deleted: Set(false),
        preparation_time: Set(input.preparation_time),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(menu_item_id = created.id, "Created menu item");
    Ok(created)
}

/// Replaces the editable fields of an existing, non-deleted menu item.
///
/// # Errors
/// Returns an error if validation fails, the item does not exist or is deleted, or the
/// target category does not exist.
#[instrument(skip(db, input))]
pub async fn update_menu_item(
    db: &DatabaseConnection,
    menu_item_id: i64,
    input: &MenuItemInput,
) -> Result<menu_item::Model> {
    let name = validate(input)?;

    let existing = get_menu_item_any(db, menu_item_id).await?;
    if existing.is_deleted {
        return Err(Error::not_found(ENTITY, menu_item_id));
    }
    if existing.category_id != input.category_id {
        category::get_category(db, input.category_id).await?;
    }

    let mut item: menu_item::ActiveModel = existing.into();
    item.search_name = Set(search_key(&name));
    item.name = Set(name);
    item.description = Set(input.description.trim().to_string());
    item.price = Set(input.price);
    item.quantity = Set(input.quantity);
    item.category_id = Set(input.category_id);
    item.image_url = Set(clean_image_url(input.image_url.as_ref()));
    item.is_available = Set(input.is_available);
    item.preparation_time = Set(input.preparation_time);
    item.updated_at = Set(chrono::Utc::now().naive_utc());

    item.update(db).await.map_err(Into::into)
}

/// Soft deletes a menu item by marking it as deleted, preserving order history.
///
/// # Errors
/// Returns an error if:
/// - The item does not exist or is already deleted
/// - The database update operation fails
#[instrument(skip(db))]
pub async fn soft_delete_menu_item(
    db: &DatabaseConnection,
    menu_item_id: i64,
) -> Result<menu_item::Model> {
    let existing = get_menu_item_any(db, menu_item_id).await?;
    if existing.is_deleted {
        return Err(Error::not_found(ENTITY, menu_item_id));
    }

    let mut item: menu_item::ActiveModel = existing.into();
    item.is_deleted = Set(true);
    item.updated_at = Set(chrono::Utc::now().naive_utc());

    let deleted = item.update(db).await?;
    info!(menu_item_id, "Soft-deleted menu item");
    Ok(deleted)
}

/// Restores a soft-deleted menu item.
///
/// # Errors
/// Returns [`Error::NotFound`] if the item does not exist and
/// [`Error::InvalidOperation`] if it is not deleted.
#[instrument(skip(db))]
pub async fn restore_menu_item(
    db: &DatabaseConnection,
    menu_item_id: i64,
) -> Result<menu_item::Model> {
    let existing = get_menu_item_any(db, menu_item_id).await?;
    if !existing.is_deleted {
        return Err(Error::invalid_operation(format!(
            "Menu item '{}' is not deleted",
            existing.name
        )));
    }

    let mut item: menu_item::ActiveModel = existing.into();
    item.is_deleted = Set(false);
    item.updated_at = Set(chrono::Utc::now().naive_utc());

    let restored = item.update(db).await?;
    info!(menu_item_id, "Restored menu item");
    Ok(restored)
}

/// Lists soft-deleted menu items, ordered by name, for the restore screen.
///
/// These items never appear in the catalog until restored with
/// [`restore_menu_item`].
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_deleted_menu_items(db: &DatabaseConnection) -> Result<Vec<menu_item::Model>> {
    MenuItem::find()
        .filter(menu_item::Column::IsDeleted.eq(true))
        .order_by_asc(menu_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}
