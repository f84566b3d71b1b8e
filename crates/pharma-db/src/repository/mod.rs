//! # Repository Module
//!
//! Database repository implementations for PharmaShelf.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Request handler                                                       │
//! │       │                                                                 │
//! │       │  db.drugs().filtered(&filter, 5, 10)                           │
//! │       ▼                                                                 │
//! │  DrugRepository                                                        │
//! │  ├── filtered(&self, filter, limit, offset)                            │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── create(&self, input, created_by)                                  │
//! │  └── update_stock(&self, id, qty)                                      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - Single-row reads return `Option<T>`; the caller decides what "missing" means.
//! - Writes that target a missing row return [`DbError::NotFound`](crate::DbError).
//! - Rows referencing other rows come back with the referenced names joined in.
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Accounts, roles, admin emails
//! - [`CategoryRepository`](category::CategoryRepository) - Categories and drug counts
//! - [`DrugRepository`](drug::DrugRepository) - Drugs, filtering, stock
//! - [`InteractionRepository`](interaction::InteractionRepository) - Symmetric pair lookup
//! - [`AlternativeRepository`](alternative::AlternativeRepository) - Suggested substitutes

pub mod alternative;
pub mod category;
pub mod drug;
pub mod interaction;
pub mod user;

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

/// Fails with `NotFound` unless `table` has a row with this id.
///
/// Writes that reference other rows resolve them first so a bad id surfaces
/// as "not found" instead of a foreign key failure.
pub(crate) async fn ensure_exists(
    pool: &SqlitePool,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> DbResult<()> {
    let exists: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS (SELECT 1 FROM {table} WHERE id = ?1)"
    ))
    .bind(id)
    .fetch_one(pool)
    .await?;

    if exists {
        Ok(())
    } else {
        Err(DbError::not_found(entity, id))
    }
}
