//! # Category Repository
//!
//! Database operations for drug categories.

use chrono::Utc;
use pharma_core::forms::NewCategory;
use pharma_core::{Category, CategoryDrugCount};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// All categories in insertion order.
    pub async fn list_all(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at, updated_at FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn create(&self, input: &NewCategory) -> DbResult<Category> {
        debug!(name = %input.name, "Creating category");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Every category with its number of drugs, in insertion order.
    ///
    /// Categories without drugs are included with a count of zero.
    pub async fn drug_counts(&self) -> DbResult<Vec<CategoryDrugCount>> {
        let counts = sqlx::query_as::<_, CategoryDrugCount>(
            r#"
            SELECT
                c.id        AS category_id,
                c.name      AS name,
                COUNT(d.id) AS drug_count
            FROM categories c
            LEFT JOIN drugs d ON d.category_id = c.id
            GROUP BY c.id, c.name
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
