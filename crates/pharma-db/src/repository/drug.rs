//! # Drug Repository
//!
//! Database operations for drugs.
//!
//! ## Key Operations
//! - Filtered, paginated listing
//! - CRUD operations
//! - Stock updates and stock statistics
//!
//! ## Filtering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How the Drug List Is Narrowed                        │
//! │                                                                         │
//! │  GET /drugs?q=par&category_id=2&in_stock_only=on&page=2                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DrugFilter { search: "par", category_id: 2, in_stock_only: true }     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE instr(lower(name), lower('par')) > 0   ← substring, any case    │
//! │    AND category_id = 2                                                 │
//! │    AND stock_quantity > 0                                              │
//! │  ORDER BY name, id                                                     │
//! │       │                                                                 │
//! │       ├── count_filtered() → total for Pagination                      │
//! │       └── filtered(limit 5, offset 5) → rows for page 2                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `instr` is used instead of `LIKE` so `%` and `_` typed by the user are
//! matched literally.

use chrono::Utc;
use pharma_core::dashboard::StockSummary;
use pharma_core::forms::{DrugFilter, NewDrug};
use pharma_core::Drug;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::ensure_exists;

const SELECT_DRUG: &str = r#"
    SELECT
        d.id,
        d.name,
        d.active_ingredient,
        d.dosage_form,
        d.indications,
        d.side_effects,
        d.stock_quantity,
        d.created_by_id,
        d.category_id,
        c.name AS category_name,
        d.created_at,
        d.updated_at
    FROM drugs d
    INNER JOIN categories c ON c.id = d.category_id
"#;

/// Repository for drug database operations.
///
/// ## Usage
/// ```rust,ignore
/// let filter = DrugFilter { search: Some("para".into()), ..Default::default() };
/// let total = db.drugs().count_filtered(&filter).await?;
/// let page = Pagination::new(total, 1);
/// let drugs = db.drugs().filtered(&filter, page.limit(), page.offset).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DrugRepository {
    pool: SqlitePool,
}

impl DrugRepository {
    /// Creates a new DrugRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DrugRepository { pool }
    }

    /// Inserts a new drug.
    ///
    /// ## Arguments
    /// * `input` - Validated drug fields
    /// * `created_by` - Id of the user creating the record
    ///
    /// ## Returns
    /// * `Ok(Drug)` - Inserted drug with its category name
    /// * `Err(DbError::NotFound)` - The user or the category doesn't exist
    pub async fn create(&self, input: &NewDrug, created_by: i64) -> DbResult<Drug> {
        debug!(name = %input.name, created_by = %created_by, "Creating drug");

        ensure_exists(&self.pool, "users", "User", created_by).await?;
        ensure_exists(&self.pool, "categories", "Category", input.category_id).await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO drugs (
                name, active_ingredient, dosage_form, indications, side_effects,
                stock_quantity, created_by_id, category_id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?9
            )
            "#,
        )
        .bind(&input.name)
        .bind(&input.active_ingredient)
        .bind(&input.dosage_form)
        .bind(&input.indications)
        .bind(&input.side_effects)
        .bind(input.stock_quantity)
        .bind(created_by)
        .bind(input.category_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Drug", id))
    }

    /// All drugs sorted by name. Feeds the drug pickers.
    pub async fn list_all(&self) -> DbResult<Vec<Drug>> {
        let drugs = sqlx::query_as::<_, Drug>(&format!("{SELECT_DRUG} ORDER BY d.name, d.id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(drugs)
    }

    /// Gets a drug by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Drug))` - Drug found
    /// * `Ok(None)` - Drug not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Drug>> {
        let drug = sqlx::query_as::<_, Drug>(&format!("{SELECT_DRUG} WHERE d.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(drug)
    }

    /// Replaces every editable field of a drug, stock included.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - The drug or the new category doesn't exist
    pub async fn update_details(&self, id: i64, input: &NewDrug) -> DbResult<Drug> {
        debug!(id = %id, "Updating drug details");

        ensure_exists(&self.pool, "drugs", "Drug", id).await?;
        ensure_exists(&self.pool, "categories", "Category", input.category_id).await?;

        sqlx::query(
            r#"
            UPDATE drugs SET
                name = ?2,
                active_ingredient = ?3,
                dosage_form = ?4,
                indications = ?5,
                side_effects = ?6,
                stock_quantity = ?7,
                category_id = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.active_ingredient)
        .bind(&input.dosage_form)
        .bind(&input.indications)
        .bind(&input.side_effects)
        .bind(input.stock_quantity)
        .bind(input.category_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Drug", id))
    }

    /// Sets the stock level to an absolute value.
    ///
    /// ## Returns
    /// * `Ok(Drug)` - The drug as stored after the update
    /// * `Err(DbError::NotFound)` - Drug doesn't exist
    pub async fn update_stock(&self, id: i64, stock_quantity: i64) -> DbResult<Drug> {
        debug!(id = %id, stock_quantity = %stock_quantity, "Updating stock");

        let result =
            sqlx::query("UPDATE drugs SET stock_quantity = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(stock_quantity)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Drug", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Drug", id))
    }

    /// One page of drugs matching `filter`, sorted by name.
    pub async fn filtered(&self, filter: &DrugFilter, limit: i64, offset: i64) -> DbResult<Vec<Drug>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_DRUG);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY d.name, d.id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let drugs = query.build_query_as::<Drug>().fetch_all(&self.pool).await?;

        debug!(count = drugs.len(), limit = limit, offset = offset, "Filtered drugs");
        Ok(drugs)
    }

    /// Number of drugs matching `filter`, for pagination.
    pub async fn count_filtered(&self, filter: &DrugFilter) -> DbResult<i64> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM drugs d");
        push_filter(&mut query, filter);

        let count = query.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Total, in-stock and out-of-stock counts.
    pub async fn stock_summary(&self) -> DbResult<StockSummary> {
        let summary = sqlx::query_as::<_, StockSummary>(
            r#"
            SELECT
                COUNT(*)                                                       AS total,
                COALESCE(SUM(CASE WHEN stock_quantity > 0 THEN 1 ELSE 0 END), 0) AS in_stock,
                COALESCE(SUM(CASE WHEN stock_quantity = 0 THEN 1 ELSE 0 END), 0) AS out_of_stock
            FROM drugs
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Drugs with `0 < stock_quantity <= threshold`, lowest stock first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Drug>> {
        let drugs = sqlx::query_as::<_, Drug>(&format!(
            "{SELECT_DRUG} WHERE d.stock_quantity > 0 AND d.stock_quantity <= ?1 \
             ORDER BY d.stock_quantity, d.name"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(drugs)
    }
}

/// Appends the WHERE clause for `filter`. Predicates are added in order:
/// name, category, stock.
fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &DrugFilter) {
    query.push(" WHERE 1 = 1");

    if let Some(search) = &filter.search {
        query
            .push(" AND instr(lower(d.name), lower(")
            .push_bind(search.clone())
            .push(")) > 0");
    }

    if let Some(category_id) = filter.category_id {
        query.push(" AND d.category_id = ").push_bind(category_id);
    }

    if filter.in_stock_only {
        query.push(" AND d.stock_quantity > 0");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
