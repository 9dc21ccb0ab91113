//! Shared test utilities for Taproom.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        category,
        dining_table::{self, TableInput},
        menu::{self, MenuItemInput},
        user::{self, ProfileInput},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a category with the given name.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, name).await
}

/// Sets up a complete test environment with one category.
/// Returns (db, category) for menu and order tests.
pub async fn setup_with_category() -> Result<(DatabaseConnection, entities::category::Model)> {
    let db = setup_test_db().await?;
    let category = create_test_category(&db, "Burgers").await?;
    Ok((db, category))
}

/// Builds a menu item input with sensible defaults.
///
/// # Defaults
/// * `description`: empty
/// * `quantity`: 10
/// * `image_url`: None
/// * `is_available`: true
/// * `preparation_time`: 10
pub fn menu_item_input(name: &str, price: f64, category_id: i64) -> MenuItemInput {
    MenuItemInput {
        name: name.to_string(),
        description: String::new(),
        price,
        quantity: 10,
        category_id,
        image_url: None,
        is_available: true,
        preparation_time: 10,
    }
}

/// Creates an available menu item with default fields.
pub async fn create_test_menu_item(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    category_id: i64,
) -> Result<entities::menu_item::Model> {
    menu::create_menu_item(db, &menu_item_input(name, price, category_id)).await
}

/// Creates a menu item with a custom preparation time.
/// Use this when testing catalog sorting.
pub async fn create_custom_menu_item(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    preparation_time: i32,
    category_id: i64,
) -> Result<entities::menu_item::Model> {
    let mut input = menu_item_input(name, price, category_id);
    input.preparation_time = preparation_time;
    menu::create_menu_item(db, &input).await
}

/// Creates an available table in the main hall.
pub async fn create_test_table(
    db: &DatabaseConnection,
    number: i32,
    capacity: i32,
) -> Result<entities::dining_table::Model> {
    let input = TableInput {
        number,
        capacity,
        location: "Main hall".to_string(),
        is_available: true,
    };
    dining_table::create_table(db, &input).await
}

/// Creates a user profile named after its id.
pub async fn create_test_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::user::Model> {
    user::upsert_user(db, user_id, &ProfileInput::default()).await
}
