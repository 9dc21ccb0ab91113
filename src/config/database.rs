//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.
//! The few constraints entities cannot express (partial and composite unique
//! indexes) are created with raw statements afterwards.

use crate::entities::{
    Category, DiningTable, MenuItem, Order, OrderItem, Reservation, User, UserRole,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://taproom.sqlite?mode=rwc";

/// Indexes that back the one-draft-per-user and one-line-per-menu-item rules.
const INDEX_STATEMENTS: [&str; 3] = [
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_orders_single_draft_per_user \
     ON orders (user_id) WHERE status = 'Draft'",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_order_items_order_menu_item \
     ON order_items (order_id, menu_item_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_roles_user_role \
     ON user_roles (user_id, role)",
];

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file that is created on first use.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Parent tables are created before the tables holding foreign keys to them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table_for(db, &schema, Category).await?;
    create_table_for(db, &schema, MenuItem).await?;
    create_table_for(db, &schema, Order).await?;
    create_table_for(db, &schema, OrderItem).await?;
    create_table_for(db, &schema, DiningTable).await?;
    create_table_for(db, &schema, Reservation).await?;
    create_table_for(db, &schema, User).await?;
    create_table_for(db, &schema, UserRole).await?;

    for statement in INDEX_STATEMENTS {
        db.execute_unprepared(statement).await?;
    }

    info!("Database tables ensured");
    Ok(())
}
