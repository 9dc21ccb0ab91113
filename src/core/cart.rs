//! Cart operations - Adding, removing and re-quantifying lines of a draft order.
//!
//! Adding a menu item that is already in the order increments the existing line with
//! a single `UPDATE ... SET quantity = quantity + n` instead of read-modify-write, and
//! `(order_id, menu_item_id)` is unique, so concurrent adds cannot lose an update or
//! produce a second line.

use crate::{
    core::{menu, order::OrderStatus, repository},
    entities::{Order, OrderItem, order_item},
    errors::{Error, Result},
};
use sea_orm::{Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

const ENTITY: &str = "order item";

async fn find_line<C>(db: &C, order_id: i64, menu_item_id: i64) -> Result<Option<order_item::Model>>
where
    C: ConnectionTrait,
{
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .filter(order_item::Column::MenuItemId.eq(menu_item_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Atomically adds `delta` to a line's quantity and returns the updated line.
async fn increment_quantity<C>(db: &C, order_item_id: i64, delta: i32) -> Result<order_item::Model>
where
    C: ConnectionTrait,
{
    OrderItem::update_many()
        .col_expr(
            order_item::Column::Quantity,
            Expr::col(order_item::Column::Quantity).add(delta),
        )
        .filter(order_item::Column::Id.eq(order_item_id))
        .exec(db)
        .await?;

    repository::get_by_id::<OrderItem, _>(db, ENTITY, order_item_id).await
}

/// Adds `quantity` units of a menu item to an order.
///
/// If the order already has a line for the menu item its quantity is increased;
/// otherwise a new line is inserted with the menu item's current price.
///
/// # Errors
/// Returns an error if:
/// - `quantity` is not positive
/// - The order does not exist, or the menu item does not exist or is deleted
/// - The order is not a draft, or the menu item is unavailable
/// - The database operation fails
#[instrument(skip(db))]
pub async fn add_item(
    db: &DatabaseConnection,
    order_id: i64,
    menu_item_id: i64,
    quantity: i32,
) -> Result<order_item::Model> {
    if quantity <= 0 {
        return Err(Error::invalid_argument("Quantity must be at least 1"));
    }

    let txn = db.begin().await?;

    let order = repository::get_by_id::<Order, _>(&txn, "order", order_id).await?;
    if OrderStatus::parse(&order.status)? != OrderStatus::Draft {
        return Err(Error::invalid_operation(format!(
            "Order {order_id} is {} and can no longer be changed",
            order.status
        )));
    }

    let line = if let Some(existing) = find_line(&txn, order_id, menu_item_id).await? {
        increment_quantity(&txn, existing.id, quantity).await?
    } else {
        let item = menu::get_menu_item_any(&txn, menu_item_id).await?;
        if item.is_deleted {
            return Err(Error::not_found("menu item", menu_item_id));
        }
        if !item.is_available {
            return Err(Error::invalid_operation(format!(
                "'{}' is currently unavailable",
                item.name
            )));
        }

        let new_line = order_item::ActiveModel {
            order_id: Set(order_id),
            menu_item_id: Set(menu_item_id),
            quantity: Set(quantity),
            price: Set(item.price),
            ..Default::default()
        };

        match new_line.insert(&txn).await {
            Ok(inserted) => inserted,
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = find_line(&txn, order_id, menu_item_id)
                    .await?
                    .ok_or_else(|| Error::not_found(ENTITY, menu_item_id))?;
                increment_quantity(&txn, existing.id, quantity).await?
            }
            Err(err) => return Err(err.into()),
        }
    };

    txn.commit().await?;

    info!(
        order_id,
        menu_item_id,
        quantity = line.quantity,
        "Cart line updated"
    );
    Ok(line)
}

/// Removes a line from its order.
///
/// # Errors
/// Returns [`Error::NotFound`] if the line does not exist.
#[instrument(skip(db))]
pub async fn remove_item(db: &DatabaseConnection, order_item_id: i64) -> Result<()> {
    repository::delete_by_id::<OrderItem, _>(db, ENTITY, order_item_id).await?;
    info!(order_item_id, "Removed cart line");
    Ok(())
}

/// Overwrites a line's quantity.
///
/// Setting the quantity a line already has succeeds and leaves it unchanged.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `quantity` is below 1 and
/// [`Error::NotFound`] if the line does not exist.
#[instrument(skip(db))]
pub async fn update_quantity(
    db: &DatabaseConnection,
    order_item_id: i64,
    quantity: i32,
) -> Result<order_item::Model> {
    if quantity < 1 {
        return Err(Error::invalid_argument("Quantity must be at least 1"));
    }

    let line = repository::get_by_id::<OrderItem, _>(db, ENTITY, order_item_id).await?;
    let mut active: order_item::ActiveModel = line.into();
    active.quantity = Set(quantity);
    active.update(db).await.map_err(Into::into)
}

/// Resolves a line only if it belongs to the user's draft order.
///
/// Lines of other users' orders, or of finalized orders, are reported as not found so
/// their existence is not revealed.
pub async fn find_owned_line(
    db: &DatabaseConnection,
    order_item_id: i64,
    user_id: &str,
) -> Result<order_item::Model> {
    let line = repository::get_by_id::<OrderItem, _>(db, ENTITY, order_item_id).await?;
    let order = repository::get_by_id::<Order, _>(db, "order", line.order_id).await?;

    if order.user_id != user_id || order.status != OrderStatus::Draft.as_str() {
        return Err(Error::not_found(ENTITY, order_item_id));
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::order::{self, get_draft_order};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_add_item_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = add_item(&db, 1, 1, 0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidArgument { message: _ }
        ));

        let result = update_quantity(&db, 1, -2).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidArgument { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_new_item_snapshots_price() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let burger = create_test_menu_item(&db, "Burger", 12.5, category.id).await?;
        let draft = get_draft_order(&db, "user-1").await?;

        let line = add_item(&db, draft.id, burger.id, 2).await?;
        assert_eq!(line.quantity, 2);
        assert_eq!(line.price, 12.5);
        assert_eq!(line.order_id, draft.id);

        let lines = order::load_lines(&db, draft.id).await?;
        assert_eq!(lines.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_existing_item_increments_line() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let burger = create_test_menu_item(&db, "Burger", 12.5, category.id).await?;
        let draft = get_draft_order(&db, "user-1").await?;

        let first = add_item(&db, draft.id, burger.id, 2).await?;
        let second = add_item(&db, draft.id, burger.id, 3).await?;

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 5);

        let lines = order::load_lines(&db, draft.id).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_rejects_missing_deleted_and_unavailable() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let draft = get_draft_order(&db, "user-1").await?;

        let missing = add_item(&db, draft.id, 999, 1).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));

        let gone = create_test_menu_item(&db, "Old Special", 8.0, category.id).await?;
        crate::core::menu::soft_delete_menu_item(&db, gone.id).await?;
        let deleted = add_item(&db, draft.id, gone.id, 1).await;
        assert!(matches!(deleted.unwrap_err(), Error::NotFound { .. }));

        let mut input = menu_item_input("Sold Out Pie", 6.0, category.id);
        input.is_available = false;
        let pie = crate::core::menu::create_menu_item(&db, &input).await?;
        let unavailable = add_item(&db, draft.id, pie.id, 1).await;
        assert!(matches!(
            unavailable.unwrap_err(),
            Error::InvalidOperation { message: _ }
        ));

        let no_order = add_item(&db, 999, pie.id, 1).await;
        assert!(matches!(no_order.unwrap_err(), Error::NotFound { .. }));

        // Nothing was inserted
        assert!(order::load_lines(&db, draft.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_to_completed_order_fails() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let burger = create_test_menu_item(&db, "Burger", 10.0, category.id).await?;
        let draft = get_draft_order(&db, "user-1").await?;
        add_item(&db, draft.id, burger.id, 1).await?;
        order::checkout(&db, "user-1").await?;

        let result = add_item(&db, draft.id, burger.id, 1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidOperation { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_item() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let burger = create_test_menu_item(&db, "Burger", 10.0, category.id).await?;
        let draft = get_draft_order(&db, "user-1").await?;
        let line = add_item(&db, draft.id, burger.id, 1).await?;

        remove_item(&db, line.id).await?;
        assert!(order::load_lines(&db, draft.id).await?.is_empty());

        let again = remove_item(&db, line.id).await;
        assert!(matches!(again.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_quantity_is_idempotent() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let burger = create_test_menu_item(&db, "Burger", 10.0, category.id).await?;
        let draft = get_draft_order(&db, "user-1").await?;
        let line = add_item(&db, draft.id, burger.id, 1).await?;

        let first = update_quantity(&db, line.id, 4).await?;
        let second = update_quantity(&db, line.id, 4).await?;
        assert_eq!(first.quantity, 4);
        assert_eq!(second.quantity, 4);

        let stored = OrderItem::find_by_id(line.id).one(&db).await?.unwrap();
        assert_eq!(stored.quantity, 4);

        let missing = update_quantity(&db, 999, 2).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_find_owned_line() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let burger = create_test_menu_item(&db, "Burger", 10.0, category.id).await?;
        let draft = get_draft_order(&db, "user-1").await?;
        let line = add_item(&db, draft.id, burger.id, 1).await?;

        assert_eq!(find_owned_line(&db, line.id, "user-1").await?.id, line.id);

        let stranger = find_owned_line(&db, line.id, "user-2").await;
        assert!(matches!(stranger.unwrap_err(), Error::NotFound { .. }));

        order::checkout(&db, "user-1").await?;
        let finalized = find_owned_line(&db, line.id, "user-1").await;
        assert!(matches!(finalized.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }
}
