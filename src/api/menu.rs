//! Public browsing endpoints: menu, categories and tables.

use crate::{
    api::{
        AppState,
        extract::{Json, Path, Query},
    },
    core::{
        catalog::{self, MenuPage, MenuQuery, SortKey},
        category,
        dining_table,
    },
    entities::{category as category_entity, dining_table as table_entity, menu_item},
    errors::Result,
};
use axum::{Router, extract::State, routing::get};
use serde::Deserialize;

/// Routes open to every caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/menu", get(list_menu))
        .route("/api/menu/{id}", get(get_menu_item))
        .route("/api/categories", get(list_categories))
        .route("/api/tables", get(list_tables))
}

/// Query string of `GET /api/menu`.
#[derive(Debug, Default, Deserialize)]
struct MenuParams {
    search: Option<String>,
    category: Option<String>,
    sort: Option<String>,
    page: Option<u64>,
    page_size: Option<u64>,
}

impl MenuParams {
    fn into_query(self, default_page_size: u64, max_page_size: u64) -> MenuQuery {
        MenuQuery {
            search: self.search,
            category: self.category,
            sort: self.sort.as_deref().map_or_else(SortKey::default, SortKey::parse),
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(default_page_size),
        }
        .clamped(max_page_size)
    }
}

/// GET /api/menu
async fn list_menu(
    State(state): State<AppState>,
    Query(params): Query<MenuParams>,
) -> Result<Json<MenuPage>> {
    let catalog_config = state.config.catalog;
    let query = params.into_query(catalog_config.default_page_size, catalog_config.max_page_size);
    Ok(Json(catalog::list_menu(&state.db, &query).await?))
}

/// GET /api/menu/{id}
async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<menu_item::Model>> {
    Ok(Json(catalog::get_menu_item(&state.db, id).await?))
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<category_entity::Model>>> {
    Ok(Json(category::list_categories(&state.db).await?))
}

#[derive(Debug, Deserialize)]
struct TableParams {
    min_capacity: Option<i32>,
}

/// GET /api/tables - reservable tables only
async fn list_tables(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<Json<Vec<table_entity::Model>>> {
    let min_capacity = params.min_capacity.unwrap_or(1);
    Ok(Json(
        dining_table::list_available_tables(&state.db, min_capacity).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_params_defaults_and_clamp() {
        let query = MenuParams::default().into_query(9, 100);
        assert_eq!(query, MenuQuery::first_page(9));

        let params = MenuParams {
            sort: Some("price_desc".to_string()),
            page: Some(3),
            page_size: Some(500),
            ..MenuParams::default()
        };
        let query = params.into_query(9, 100);
        assert_eq!(query.sort, SortKey::PriceDesc);
        assert_eq!(query.page, 3);
        assert_eq!(query.page_size, 100);
    }
}
