//! Category business logic - Handles menu category administration.
//!
//! Categories are hard-deleted, but only once no menu item references them. Soft-deleted
//! menu items still count, since their rows remain and order history points at them.

use crate::{
    core::repository,
    entities::{Category, MenuItem, category, menu_item},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

const ENTITY: &str = "category";

/// Retrieves all categories, ordered alphabetically by name.
///
/// Used by the public category list and by the admin screen, so it includes
/// categories whose items are all deleted.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by id.
///
/// # Errors
/// Returns [`Error::NotFound`] if no category has this id.
pub async fn get_category(db: &DatabaseConnection, category_id: i64) -> Result<category::Model> {
    repository::get_by_id::<Category, _>(db, ENTITY, category_id).await
}

/// Finds a category by its exact name, returning None if no category has it.
///
/// The name is trimmed before the lookup. The catalog uses this to resolve the
/// category filter and seeding uses it to skip categories that already exist.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

fn validated_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_argument("Category name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn name_taken(name: &str) -> String {
    format!("A category named '{name}' already exists")
}

async fn ensure_name_free(
    db: &DatabaseConnection,
    name: &str,
    except_id: Option<i64>,
) -> Result<()> {
    if let Some(existing) = get_category_by_name(db, name).await? {
        if Some(existing.id) != except_id {
            return Err(Error::invalid_operation(name_taken(name)));
        }
    }
    Ok(())
}

/// Creates a new category.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - Another category already has this name
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_category(db: &DatabaseConnection, name: &str) -> Result<category::Model> {
    let name = validated_name(name)?;
    ensure_name_free(db, &name, None).await?;

    let created = category::ActiveModel {
        name: Set(name.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| repository::conflict_on_unique(err, || name_taken(&name)))?;

    info!(category_id = created.id, "Created category '{}'", created.name);
    Ok(created)
}

/// Renames an existing category.
///
/// # Errors
/// Returns an error if the name is invalid or taken, or the category does not exist.
#[instrument(skip(db))]
pub async fn rename_category(
    db: &DatabaseConnection,
    category_id: i64,
    new_name: &str,
) -> Result<category::Model> {
    let name = validated_name(new_name)?;
    let existing = get_category(db, category_id).await?;
    ensure_name_free(db, &name, Some(category_id)).await?;

    let mut active: category::ActiveModel = existing.into();
    active.name = Set(name.clone());
    active
        .update(db)
        .await
        .map_err(|err| repository::conflict_on_unique(err, || name_taken(&name)))
}

/// Counts menu items (deleted or not) that reference a category.
///
/// A category with a non-zero count cannot be deleted.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn count_menu_items(db: &DatabaseConnection, category_id: i64) -> Result<u64> {
    MenuItem::find()
        .filter(menu_item::Column::CategoryId.eq(category_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Deletes a category that has no menu items.
///
/// # Errors
/// Returns an error if:
/// - The category does not exist
/// - At least one menu item still references the category
/// - The database delete fails
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let category = get_category(db, category_id).await?;

    let item_count = count_menu_items(db, category_id).await?;
    if item_count > 0 {
        return Err(Error::invalid_operation(format!(
            "Category '{}' still has {item_count} menu item(s)",
            category.name
        )));
    }

    repository::delete_by_id::<Category, _>(db, ENTITY, category_id).await?;
    info!(category_id, "Deleted category '{}'", category.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_category_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_category(&db, "   ").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidArgument { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_category_is_conflict() -> Result<()> {
        let db = setup_test_db().await?;

        let (first, second) = tokio::join!(
            create_category(&db, "Wings"),
            create_category(&db, "Wings"),
        );
        match (first, second) {
            (Ok(_), Err(Error::InvalidOperation { .. }))
            | (Err(Error::InvalidOperation { .. }), Ok(_)) => {}
            (a, b) => panic!("expected one category and one conflict, got {a:?} and {b:?}"),
        }
        assert_eq!(list_categories(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_list_categories() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_category(&db, "Wings").await?;
        create_test_category(&db, "Burgers").await?;

        let categories = list_categories(&db).await?;
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Burgers", "Wings"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_duplicate_category_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Burgers").await?;

        let result = create_category(&db, " Burgers ").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidOperation { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_rename_category() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Burgers").await?;

        let renamed = rename_category(&db, category.id, "Smash Burgers").await?;
        assert_eq!(renamed.name, "Smash Burgers");

        // Renaming to its own name is allowed
        rename_category(&db, category.id, "Smash Burgers").await?;

        let missing = rename_category(&db, 999, "Anything").await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_with_items_fails() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        create_test_menu_item(&db, "Classic Burger", 10.0, category.id).await?;

        let result = delete_category(&db, category.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidOperation { message: _ }
        ));

        // Still there
        assert!(Category::find_by_id(category.id).one(&db).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_with_only_soft_deleted_items_fails() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let item = create_test_menu_item(&db, "Old Burger", 10.0, category.id).await?;
        crate::core::menu::soft_delete_menu_item(&db, item.id).await?;

        let result = delete_category(&db, category.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidOperation { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_empty_category_succeeds() -> Result<()> {
        let (db, category) = setup_with_category().await?;

        delete_category(&db, category.id).await?;
        assert!(Category::find_by_id(category.id).one(&db).await?.is_none());

        let again = delete_category(&db, category.id).await;
        assert!(matches!(again.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }
}
