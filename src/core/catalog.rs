//! Catalog browsing - Filters, sorts and paginates the visible menu.
//!
//! Only items that are not soft-deleted are ever listed. The page carries the total
//! number of matches so callers can render page links.

use crate::{
    core::{category, menu},
    entities::{MenuItem, menu_item},
    errors::{Error, Result},
};
use sea_orm::{
    PaginatorTrait, QueryOrder, Select,
    prelude::*,
    sea_query::{Expr, LikeExpr},
};
use serde::Serialize;
use tracing::{debug, instrument};

/// Order in which menu items are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Name ascending
    #[default]
    Name,
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
    /// Quickest to prepare first
    PrepTimeAsc,
    /// Slowest to prepare first
    PrepTimeDesc,
}

impl SortKey {
    /// Parses a sort key from a query string value. Unknown values fall back to
    /// [`SortKey::Name`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "price" | "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "prep_time" | "prep_time_asc" => Self::PrepTimeAsc,
            "prep_time_desc" => Self::PrepTimeDesc,
            _ => Self::Name,
        }
    }

    fn apply(self, select: Select<MenuItem>) -> Select<MenuItem> {
        let sorted = match self {
            Self::Name => select.order_by_asc(menu_item::Column::Name),
            Self::PriceAsc => select.order_by_asc(menu_item::Column::Price),
            Self::PriceDesc => select.order_by_desc(menu_item::Column::Price),
            Self::PrepTimeAsc => select.order_by_asc(menu_item::Column::PreparationTime),
            Self::PrepTimeDesc => select.order_by_desc(menu_item::Column::PreparationTime),
        };
        // Stable pages across requests
        sorted.order_by_asc(menu_item::Column::Id)
    }
}

/// A menu listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuQuery {
    /// Case-insensitive substring matched against item names
    pub search: Option<String>,
    /// Category name to restrict the listing to
    pub category: Option<String>,
    /// Sort order
    pub sort: SortKey,
    /// 1-based page number
    pub page: u64,
    /// Items per page
    pub page_size: u64,
}

impl MenuQuery {
    /// First page of the whole menu, sorted by name.
    #[must_use]
    pub const fn first_page(page_size: u64) -> Self {
        Self {
            search: None,
            category: None,
            sort: SortKey::Name,
            page: 1,
            page_size,
        }
    }

    /// Caps the page size at `max_page_size`.
    #[must_use]
    pub fn clamped(mut self, max_page_size: u64) -> Self {
        self.page_size = self.page_size.min(max_page_size);
        self
    }
}

/// One page of the menu listing.
#[derive(Debug, Clone, Serialize)]
pub struct MenuPage {
    /// Items on this page
    pub items: Vec<menu_item::Model>,
    /// 1-based page number that was requested
    pub page: u64,
    /// Items per page
    pub page_size: u64,
    /// Number of matching items, ignoring pagination
    pub total: u64,
    /// Number of pages needed to show every match
    pub total_pages: u64,
}

impl MenuPage {
    fn new(items: Vec<menu_item::Model>, query: &MenuQuery, total: u64) -> Self {
        Self {
            items,
            page: query.page,
            page_size: query.page_size,
            total,
            total_pages: total.div_ceil(query.page_size),
        }
    }
}

/// Escapes LIKE wildcards so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Lists one page of visible menu items matching the query.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `page` or `page_size` is zero, or an error if
/// the database query fails.
#[instrument(skip(db))]
pub async fn list_menu(db: &DatabaseConnection, query: &MenuQuery) -> Result<MenuPage> {
    if query.page == 0 {
        return Err(Error::invalid_argument("page must be at least 1"));
    }
    if query.page_size == 0 {
        return Err(Error::invalid_argument("page_size must be greater than 0"));
    }

    let mut select = MenuItem::find().filter(menu_item::Column::IsDeleted.eq(false));

    if let Some(category_name) = non_blank(query.category.as_ref()) {
        let Some(category) = category::get_category_by_name(db, category_name).await? else {
            debug!("Unknown category '{}', returning an empty page", category_name);
            return Ok(MenuPage::new(Vec::new(), query, 0));
        };
        select = select.filter(menu_item::Column::CategoryId.eq(category.id));
    }

    if let Some(search) = non_blank(query.search.as_ref()) {
        let pattern = format!("%{}%", escape_like(&menu::search_key(search)));
        select = select.filter(
            Expr::col(menu_item::Column::SearchName).like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    let paginator = query.sort.apply(select).paginate(db, query.page_size);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(query.page - 1).await?;

    debug!(
        total,
        returned = items.len(),
        "Listed menu page {}",
        query.page
    );
    Ok(MenuPage::new(items, query, total))
}

/// Retrieves a single menu item as a customer sees it.
///
/// # Errors
/// Returns [`Error::NotFound`] if the item does not exist or is soft-deleted.
pub async fn get_menu_item(db: &DatabaseConnection, menu_item_id: i64) -> Result<menu_item::Model> {
    let item = menu::get_menu_item_any(db, menu_item_id).await?;
    if item.is_deleted {
        return Err(Error::not_found("menu item", menu_item_id));
    }
    Ok(item)
}
