//! Startup seeding of categories, menu items and tables from config.toml, plus the
//! bootstrap administrator.
//!
//! Seeding only ever inserts what is missing. Rows that already exist, including
//! menu items an administrator soft-deleted, are left untouched.

use crate::{
    config::settings::AppConfig,
    core::{
        category,
        dining_table::{self, TableInput},
        menu::{self, MenuItemInput},
        repository,
        user::{self, ProfileInput, Role},
    },
    entities::{DiningTable, MenuItem},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Counts of rows inserted by [`seed_from_config`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// Categories created
    pub categories: usize,
    /// Menu items created
    pub menu_items: usize,
    /// Tables created
    pub tables: usize,
}

async fn ensure_category(db: &DatabaseConnection, name: &str) -> Result<(i64, bool)> {
    if let Some(existing) = category::get_category_by_name(db, name.trim()).await? {
        return Ok((existing.id, false));
    }
    let created = category::create_category(db, name).await?;
    Ok((created.id, true))
}

/// Inserts the categories, menu items and tables listed in the config that are not
/// already in the database.
///
/// Menu items are matched by name and tables by number. A menu item whose category
/// is not listed gets that category created.
///
/// # Errors
/// Returns an error if a seed entry fails validation or a database call fails.
#[instrument(skip(db, config))]
pub async fn seed_from_config(db: &DatabaseConnection, config: &AppConfig) -> Result<SeedSummary> {
    info!(
        "Seeding from config: {} categories, {} menu items, {} tables",
        config.categories.len(),
        config.menu_items.len(),
        config.tables.len()
    );
    let mut summary = SeedSummary::default();

    for seed in &config.categories {
        let (_, created) = ensure_category(db, &seed.name).await?;
        if created {
            summary.categories += 1;
        }
    }

    let mut known_items: HashSet<String> = repository::get_all::<MenuItem, _>(db)
        .await?
        .into_iter()
        .map(|item| item.name)
        .collect();

    for seed in &config.menu_items {
        if known_items.contains(seed.name.trim()) {
            debug!("Menu item '{}' already exists. Skipping.", seed.name);
            continue;
        }

        let (category_id, created) = ensure_category(db, &seed.category).await?;
        if created {
            warn!(
                "Category '{}' for menu item '{}' was not listed; created it",
                seed.category, seed.name
            );
            summary.categories += 1;
        }

        let input = MenuItemInput {
            name: seed.name.clone(),
            description: seed.description.clone(),
            price: seed.price,
            quantity: seed.quantity,
            category_id,
            image_url: seed.image_url.clone(),
            is_available: true,
            preparation_time: seed.preparation_time,
        };
        let item = menu::create_menu_item(db, &input).await?;
        known_items.insert(item.name);
        summary.menu_items += 1;
    }

    let known_tables: HashSet<i32> = repository::get_all::<DiningTable, _>(db)
        .await?
        .into_iter()
        .map(|table| table.number)
        .collect();

    for seed in &config.tables {
        if known_tables.contains(&seed.number) {
            debug!("Table {} already exists. Skipping.", seed.number);
            continue;
        }
        let input = TableInput {
            number: seed.number,
            capacity: seed.capacity,
            location: seed.location.clone(),
            is_available: true,
        };
        dining_table::create_table(db, &input).await?;
        summary.tables += 1;
    }

    info!(
        categories = summary.categories,
        menu_items = summary.menu_items,
        tables = summary.tables,
        "Finished seeding"
    );
    Ok(summary)
}

/// Makes sure `user_id` has a profile and the Admin role.
///
/// # Errors
/// Returns an error if the user id is blank or a database call fails.
#[instrument(skip(db))]
pub async fn bootstrap_admin(
    db: &DatabaseConnection,
    user_id: &str,
    display_name: &str,
) -> Result<()> {
    let profile = ProfileInput {
        display_name: Some(display_name.to_string()),
        email: None,
    };
    let admin = user::upsert_user(db, user_id, &profile).await?;
    user::assign_role(db, &admin.id, Role::Admin).await?;
    info!(user_id = %admin.id, "Bootstrap administrator ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::parse_config;
    use crate::test_utils::*;

    const SEED_TOML: &str = r#"
        [[categories]]
        name = "Burgers"

        [[categories]]
        name = "Drinks"

        [[menu_items]]
        name = "Classic Burger"
        price = 11.5
        category = "Burgers"
        preparation_time = 15

        [[menu_items]]
        name = "Lager"
        price = 5.0
        category = "Drinks"

        [[menu_items]]
        name = "Nachos"
        price = 8.0
        category = "Snacks"

        [[tables]]
        number = 1
        capacity = 4
        location = "Window"

        [[tables]]
        number = 2
        capacity = 8
    "#;

    #[tokio::test]
    async fn test_seed_from_config_inserts_missing_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(SEED_TOML)?;

        let summary = seed_from_config(&db, &config).await?;
        assert_eq!(
            summary,
            SeedSummary {
                categories: 3,
                menu_items: 3,
                tables: 2
            }
        );

        let snacks = category::get_category_by_name(&db, "Snacks").await?;
        assert!(snacks.is_some());
        assert_eq!(dining_table::list_tables(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent_and_keeps_deleted_items() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(SEED_TOML)?;
        seed_from_config(&db, &config).await?;

        let nachos = repository::get_all::<MenuItem, _>(&db)
            .await?
            .into_iter()
            .find(|item| item.name == "Nachos")
            .unwrap();
        menu::soft_delete_menu_item(&db, nachos.id).await?;

        let second = seed_from_config(&db, &config).await?;
        assert_eq!(second, SeedSummary::default());

        let deleted = menu::list_deleted_menu_items(&db).await?;
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].name, "Nachos");

        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_admin() -> Result<()> {
        let db = setup_test_db().await?;

        bootstrap_admin(&db, "root", "Owner").await?;
        bootstrap_admin(&db, "root", "Owner").await?;

        assert_eq!(user::roles_for_user(&db, "root").await?, vec![Role::Admin]);
        assert_eq!(user::get_user(&db, "root").await?.display_name, "Owner");

        Ok(())
    }
}
