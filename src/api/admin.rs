//! Management endpoints under `/api/admin`.
//!
//! Everything here requires the Admin role, except the order and reservation
//! overviews which staff may also read.

use crate::{
    api::{
        AppState,
        auth::{AdminUser, StaffUser},
        extract::{Json, Path},
        reservations::{ReservationResponse, to_responses},
    },
    core::{
        category,
        dining_table::{self, TableInput},
        menu::{self, MenuItemInput},
        order,
        reservation,
        user::{self, Role, UserWithRoles},
    },
    entities::{
        category as category_entity, dining_table as table_entity, menu_item,
        order as order_entity,
    },
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

/// Admin routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/categories", get(list_categories).post(create_category))
        .route(
            "/api/admin/categories/{id}",
            put(rename_category).delete(delete_category),
        )
        .route("/api/admin/menu-items", post(create_menu_item))
        .route("/api/admin/menu-items/deleted", get(list_deleted_menu_items))
        .route(
            "/api/admin/menu-items/{id}",
            put(update_menu_item).delete(delete_menu_item),
        )
        .route("/api/admin/menu-items/{id}/restore", post(restore_menu_item))
        .route("/api/admin/tables", get(list_tables).post(create_table))
        .route(
            "/api/admin/tables/{id}",
            put(update_table).delete(delete_table),
        )
        .route("/api/admin/reservations", get(list_reservations))
        .route("/api/admin/orders", get(list_orders))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}/roles", post(assign_role))
        .route("/api/admin/users/{id}/roles/{role}", delete(remove_role))
}

#[derive(Debug, Deserialize)]
struct CategoryName {
    name: String,
}

async fn list_categories(
    State(state): State<AppState>,
    _: AdminUser,
) -> Result<Json<Vec<category_entity::Model>>> {
    Ok(Json(category::list_categories(&state.db).await?))
}

async fn create_category(
    State(state): State<AppState>,
    _: AdminUser,
    Json(body): Json<CategoryName>,
) -> Result<(StatusCode, Json<category_entity::Model>)> {
    let created = category::create_category(&state.db, &body.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn rename_category(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    Json(body): Json<CategoryName>,
) -> Result<Json<category_entity::Model>> {
    Ok(Json(category::rename_category(&state.db, id, &body.name).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    category::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_menu_item(
    State(state): State<AppState>,
    _: AdminUser,
    Json(input): Json<MenuItemInput>,
) -> Result<(StatusCode, Json<menu_item::Model>)> {
    let created = menu::create_menu_item(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_menu_item(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    Json(input): Json<MenuItemInput>,
) -> Result<Json<menu_item::Model>> {
    Ok(Json(menu::update_menu_item(&state.db, id, &input).await?))
}

async fn delete_menu_item(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<menu_item::Model>> {
    Ok(Json(menu::soft_delete_menu_item(&state.db, id).await?))
}

async fn restore_menu_item(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<menu_item::Model>> {
    Ok(Json(menu::restore_menu_item(&state.db, id).await?))
}

async fn list_deleted_menu_items(
    State(state): State<AppState>,
    _: AdminUser,
) -> Result<Json<Vec<menu_item::Model>>> {
    Ok(Json(menu::list_deleted_menu_items(&state.db).await?))
}

async fn list_tables(
    State(state): State<AppState>,
    _: AdminUser,
) -> Result<Json<Vec<table_entity::Model>>> {
    Ok(Json(dining_table::list_tables(&state.db).await?))
}

async fn create_table(
    State(state): State<AppState>,
    _: AdminUser,
    Json(input): Json<TableInput>,
) -> Result<(StatusCode, Json<table_entity::Model>)> {
    let created = dining_table::create_table(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_table(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
    Json(input): Json<TableInput>,
) -> Result<Json<table_entity::Model>> {
    Ok(Json(dining_table::update_table(&state.db, id, &input).await?))
}

async fn delete_table(
    State(state): State<AppState>,
    _: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    dining_table::delete_table(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_reservations(
    State(state): State<AppState>,
    _: StaffUser,
) -> Result<Json<Vec<ReservationResponse>>> {
    let all = reservation::list_all_reservations(&state.db).await?;
    Ok(Json(to_responses(all)))
}

async fn list_orders(
    State(state): State<AppState>,
    _: StaffUser,
) -> Result<Json<Vec<order_entity::Model>>> {
    Ok(Json(order::list_all_orders(&state.db).await?))
}

async fn list_users(
    State(state): State<AppState>,
    _: AdminUser,
) -> Result<Json<Vec<UserWithRoles>>> {
    Ok(Json(user::list_users(&state.db).await?))
}

#[derive(Debug, Deserialize)]
struct RoleGrant {
    role: Role,
}

async fn assign_role(
    State(state): State<AppState>,
    _: AdminUser,
    Path(user_id): Path<String>,
    Json(body): Json<RoleGrant>,
) -> Result<StatusCode> {
    user::assign_role(&state.db, &user_id, body.role).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_role(
    State(state): State<AppState>,
    _: AdminUser,
    Path((user_id, role)): Path<(String, String)>,
) -> Result<StatusCode> {
    let role = Role::parse(&role)?;
    user::remove_role(&state.db, &user_id, role).await?;
    Ok(StatusCode::NO_CONTENT)
}
