//! Order business logic - Draft order aggregation and order lifecycle.
//!
//! Every user has at most one order in `Draft` status, which acts as their cart. The
//! database enforces this with a partial unique index, so creating a draft re-reads the
//! existing one when a concurrent request won the race. The draft total is recomputed
//! from the line items whenever the draft is fetched.
//!
//! Status transitions: `Draft -> Completed` and `Draft -> Canceled`. Both targets are
//! terminal.

use crate::{
    core::repository,
    entities::{MenuItem, Order, OrderItem, order, order_item},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument, warn};

const ENTITY: &str = "order";

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// In-progress cart
    Draft,
    /// Finalized
    Completed,
    /// Abandoned
    Canceled,
}

impl OrderStatus {
    /// Text stored in the `orders.status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Completed => "Completed",
            Self::Canceled => "Canceled",
        }
    }

    /// Parses the stored text form.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for unknown values.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "Draft" => Ok(Self::Draft),
            "Completed" => Ok(Self::Completed),
            "Canceled" => Ok(Self::Canceled),
            other => Err(Error::invalid_argument(format!(
                "Unknown order status '{other}'"
            ))),
        }
    }

    /// Whether an order in this state may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Completed) | (Self::Draft, Self::Canceled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order line expanded with the menu item's current name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    /// Order item id
    pub id: i64,
    /// Menu item ordered
    pub menu_item_id: i64,
    /// Current display name of the menu item
    pub name: String,
    /// Units ordered
    pub quantity: i32,
    /// Unit price snapshotted when the line was added
    pub price: f64,
    /// `quantity * price`
    pub line_total: f64,
}

/// An order together with its expanded lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetails {
    /// Order id
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Current status
    pub status: OrderStatus,
    /// Order total
    pub total: f64,
    /// Order lines, oldest first
    pub items: Vec<OrderLine>,
}

impl OrderDetails {
    fn from_parts(order: order::Model, items: Vec<OrderLine>) -> Result<Self> {
        Ok(Self {
            status: OrderStatus::parse(&order.status)?,
            id: order.id,
            user_id: order.user_id,
            created_at: order.created_at,
            total: order.total,
            items,
        })
    }
}

/// Sum of quantity x snapshotted price over the lines.
#[must_use]
pub fn compute_total(lines: &[OrderLine]) -> f64 {
    lines.iter().map(|line| line.line_total).sum()
}

/// Finds the user's draft order, if any.
///
/// Generic over the connection so that cart operations can call it inside their
/// transaction. At most one draft exists per user.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn find_draft<C>(db: &C, user_id: &str) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::Status.eq(OrderStatus::Draft.as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts an empty draft for the user, or returns the one a concurrent request just
/// created.
async fn create_draft<C>(db: &C, user_id: &str) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let draft = order::ActiveModel {
        user_id: Set(user_id.to_string()),
        created_at: Set(Utc::now()),
        status: Set(OrderStatus::Draft.as_str().to_string()),
        total: Set(0.0),
        ..Default::default()
    };

    match draft.insert(db).await {
        Ok(created) => {
            info!(order_id = created.id, user_id, "Created draft order");
            Ok(created)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            warn!(user_id, "Draft order created concurrently, reusing it");
            find_draft(db, user_id)
                .await?
                .ok_or_else(|| Error::not_found("draft order", user_id))
        }
        Err(err) => Err(err.into()),
    }
}

/// Loads the lines of an order with current menu item names, oldest first.
///
/// Prices are the ones snapshotted when each line was added, while names follow
/// later renames of the menu item.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn load_lines<C>(db: &C, order_id: i64) -> Result<Vec<OrderLine>>
where
    C: ConnectionTrait,
{
    let rows = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .find_also_related(MenuItem)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(line, item)| OrderLine {
            id: line.id,
            menu_item_id: line.menu_item_id,
            name: item.map(|i| i.name).unwrap_or_default(),
            quantity: line.quantity,
            price: line.price,
            line_total: f64::from(line.quantity) * line.price,
        })
        .collect())
}

/// Recomputes the total of an order from its lines and persists it.
async fn refresh_total<C>(db: &C, order: order::Model) -> Result<(order::Model, Vec<OrderLine>)>
where
    C: ConnectionTrait,
{
    let lines = load_lines(db, order.id).await?;
    let total = compute_total(&lines);

    let mut active: order::ActiveModel = order.into();
    active.total = Set(total);
    let updated = active.update(db).await?;

    Ok((updated, lines))
}

/// Returns the user's draft order, creating an empty one if none exists.
///
/// An existing draft has its total recomputed from the current lines and persisted
/// before it is returned. Users are not validated here; identity is established by
/// the authentication layer.
#[instrument(skip(db))]
pub async fn get_draft_order(db: &DatabaseConnection, user_id: &str) -> Result<OrderDetails> {
    let Some(draft) = find_draft(db, user_id).await? else {
        let created = create_draft(db, user_id).await?;
        return OrderDetails::from_parts(created, Vec::new());
    };

    let (updated, lines) = refresh_total(db, draft).await?;
    debug!(order_id = updated.id, total = updated.total, "Recomputed draft total");
    OrderDetails::from_parts(updated, lines)
}

/// Retrieves any order with its lines.
///
/// # Errors
/// Returns [`Error::NotFound`] if the order does not exist.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<OrderDetails> {
    let order = repository::get_by_id::<Order, _>(db, ENTITY, order_id).await?;
    let lines = load_lines(db, order.id).await?;
    OrderDetails::from_parts(order, lines)
}

/// Lists a user's orders in every status, newest first.
///
/// Orders created in the same instant are ordered by id. Only the order rows are
/// returned; use [`get_order`] for the lines.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_orders_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every order of every user, newest first.
///
/// Backs the staff order overview.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_all_orders(db: &DatabaseConnection) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an order to a new status.
///
/// The status check, the total and the write happen in one transaction, and the write
/// only matches rows that are still `Draft`. Of two concurrent transitions on the same
/// order exactly one succeeds, and a completed order's total covers every line it
/// was completed with.
///
/// # Errors
/// Returns an error if:
/// - The order does not exist
/// - The transition is not allowed (only Draft can change, to Completed or Canceled)
/// - Another request changed the order's status first
/// - The order is being completed with no lines
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    next: OrderStatus,
) -> Result<OrderDetails> {
    let txn = db.begin().await?;

    let order = repository::get_by_id::<Order, _>(&txn, ENTITY, order_id).await?;
    let current = OrderStatus::parse(&order.status)?;
    if !current.can_transition_to(next) {
        return Err(Error::invalid_operation(format!(
            "Order {order_id} cannot move from {current} to {next}"
        )));
    }

    let lines = load_lines(&txn, order_id).await?;
    if next == OrderStatus::Completed && lines.is_empty() {
        return Err(Error::invalid_operation(format!(
            "Order {order_id} has no items to complete"
        )));
    }

    let changed = Order::update_many()
        .col_expr(order::Column::Status, Expr::value(next.as_str()))
        .col_expr(order::Column::Total, Expr::value(compute_total(&lines)))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Status.eq(current.as_str()))
        .exec(&txn)
        .await?;
    if changed.rows_affected == 0 {
        warn!(order_id, status = %next, "Order status changed concurrently");
        return Err(Error::invalid_operation(format!(
            "Order {order_id} is no longer {current}"
        )));
    }

    let updated = repository::get_by_id::<Order, _>(&txn, ENTITY, order_id).await?;
    txn.commit().await?;

    info!(order_id, status = %next, "Order status changed");
    OrderDetails::from_parts(updated, lines)
}

async fn require_draft(db: &DatabaseConnection, user_id: &str) -> Result<order::Model> {
    find_draft(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("draft order", user_id))
}

/// Finalizes the user's non-empty draft order.
///
/// # Errors
/// Returns [`Error::NotFound`] if the user has no draft and
/// [`Error::InvalidOperation`] if the draft is empty.
pub async fn checkout(db: &DatabaseConnection, user_id: &str) -> Result<OrderDetails> {
    let draft = require_draft(db, user_id).await?;
    update_order_status(db, draft.id, OrderStatus::Completed).await
}

/// Abandons the user's draft order.
///
/// # Errors
/// Returns [`Error::NotFound`] if the user has no draft.
pub async fn cancel_draft(db: &DatabaseConnection, user_id: &str) -> Result<OrderDetails> {
    let draft = require_draft(db, user_id).await?;
    update_order_status(db, draft.id, OrderStatus::Canceled).await
}

/// Total number of units in the user's draft, 0 when there is no draft.
///
/// Unlike [`get_draft_order`] this never creates a draft, so it is safe to call on
/// every page view.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn count_cart_items(db: &DatabaseConnection, user_id: &str) -> Result<i64> {
    let Some(draft) = find_draft(db, user_id).await? else {
        return Ok(0);
    };

    let lines = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(draft.id))
        .all(db)
        .await?;
    Ok(lines.iter().map(|line| i64::from(line.quantity)).sum())
}
