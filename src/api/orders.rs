//! Order and cart endpoints.
//!
//! The cart is the caller's draft order. Cart line ids belonging to anyone else are
//! reported as not found.

use crate::{
    api::{
        AppState,
        auth::{CurrentUser, StaffUser},
        extract::{Json, Path},
    },
    core::{
        cart,
        order::{self, OrderDetails, OrderStatus},
    },
    entities::order as order_entity,
    errors::{Error, Result},
};
use axum::{
    Router,
    extract::State,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Order and cart routes; all require a caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_my_orders))
        .route("/api/orders/draft", get(get_draft))
        .route("/api/orders/draft/checkout", post(checkout))
        .route("/api/orders/draft/cancel", post(cancel_draft))
        .route("/api/orders/{id}", get(get_order).put(update_status))
        .route("/api/cart/count", get(cart_count))
        .route("/api/cart/items", post(add_cart_item))
        .route(
            "/api/cart/items/{id}",
            put(update_cart_item).delete(remove_cart_item),
        )
}

/// GET /api/orders/draft
async fn get_draft(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<OrderDetails>> {
    Ok(Json(order::get_draft_order(&state.db, &user.id).await?))
}

/// POST /api/orders/draft/checkout
async fn checkout(State(state): State<AppState>, user: CurrentUser) -> Result<Json<OrderDetails>> {
    Ok(Json(order::checkout(&state.db, &user.id).await?))
}

/// POST /api/orders/draft/cancel
async fn cancel_draft(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<OrderDetails>> {
    Ok(Json(order::cancel_draft(&state.db, &user.id).await?))
}

/// GET /api/orders - the caller's own orders
async fn list_my_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<order_entity::Model>>> {
    Ok(Json(order::list_orders_for_user(&state.db, &user.id).await?))
}

/// GET /api/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetails>> {
    let details = order::get_order(&state.db, id).await?;
    if details.user_id != user.id && !user.is_staff() {
        return Err(Error::not_found("order", id));
    }
    Ok(Json(details))
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: OrderStatus,
}

/// PUT /api/orders/{id}
async fn update_status(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<OrderDetails>> {
    Ok(Json(
        order::update_order_status(&state.db, id, body.status).await?,
    ))
}

/// GET /api/cart/count
async fn cart_count(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Value>> {
    let count = order::count_cart_items(&state.db, &user.id).await?;
    Ok(Json(json!({ "count": count })))
}

#[derive(Debug, Deserialize)]
struct AddCartItem {
    menu_item_id: i64,
    #[serde(default = "one")]
    quantity: i32,
}

const fn one() -> i32 {
    1
}

/// POST /api/cart/items - returns the updated cart
async fn add_cart_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<AddCartItem>,
) -> Result<Json<OrderDetails>> {
    let draft = order::get_draft_order(&state.db, &user.id).await?;
    cart::add_item(&state.db, draft.id, body.menu_item_id, body.quantity).await?;
    Ok(Json(order::get_draft_order(&state.db, &user.id).await?))
}

#[derive(Debug, Deserialize)]
struct QuantityUpdate {
    quantity: i32,
}

/// PUT /api/cart/items/{id}
async fn update_cart_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<QuantityUpdate>,
) -> Result<Json<OrderDetails>> {
    let line = cart::find_owned_line(&state.db, id, &user.id).await?;
    cart::update_quantity(&state.db, line.id, body.quantity).await?;
    Ok(Json(order::get_draft_order(&state.db, &user.id).await?))
}

/// DELETE /api/cart/items/{id}
async fn remove_cart_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetails>> {
    let line = cart::find_owned_line(&state.db, id, &user.id).await?;
    cart::remove_item(&state.db, line.id).await?;
    Ok(Json(order::get_draft_order(&state.db, &user.id).await?))
}
