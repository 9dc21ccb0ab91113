//! Generic lookups shared by every entity with an integer primary key.
//!
//! Each entity module still owns its own create and update logic; these helpers
//! only cover the "by id, or not found" reads and deletes that are otherwise
//! repeated everywhere, plus the mapping of unique-index conflicts.

use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PrimaryKeyTrait, SqlErr};

/// Loads a row by primary key, failing with [`Error::NotFound`] when it is absent.
///
/// `entity` is the human-readable name used in the error message.
pub async fn get_by_id<E, C>(db: &C, entity: &'static str, id: i64) -> Result<E::Model>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i64>,
    C: ConnectionTrait,
{
    E::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(entity, id))
}

/// Loads every row of an entity.
pub async fn get_all<E, C>(db: &C) -> Result<Vec<E::Model>>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    E::find().all(db).await.map_err(Into::into)
}

/// Hard-deletes a row by primary key, failing with [`Error::NotFound`] when no row
/// was removed.
pub async fn delete_by_id<E, C>(db: &C, entity: &'static str, id: i64) -> Result<()>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i64>,
    C: ConnectionTrait,
{
    let result = E::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(entity, id));
    }
    Ok(())
}

/// Turns a unique constraint violation into [`Error::InvalidOperation`] carrying
/// `message`. Any other database error is passed through unchanged.
///
/// Checks like "is this name taken" run before the write, but a concurrent request
/// can still slip in between; this keeps the outcome the same either way.
pub fn conflict_on_unique(err: DbErr, message: impl FnOnce() -> String) -> Error {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        Error::invalid_operation(message())
    } else {
        err.into()
    }
}
