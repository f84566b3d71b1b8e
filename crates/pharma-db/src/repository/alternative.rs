//! # Alternative Repository
//!
//! Suggested substitutes for a drug. Suggestions are one-way: adding B as an
//! alternative for A does not make A an alternative for B.

use chrono::Utc;
use pharma_core::forms::NewAlternative;
use pharma_core::DrugAlternative;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::ensure_exists;

const SELECT_ALTERNATIVE: &str = r#"
    SELECT
        alt.id,
        alt.drug_id,
        alt.alternative_drug_id,
        d.name           AS alternative_drug_name,
        d.stock_quantity AS alternative_stock_quantity,
        alt.note,
        alt.created_at,
        alt.updated_at
    FROM drug_alternatives alt
    INNER JOIN drugs d ON d.id = alt.alternative_drug_id
"#;

/// Repository for alternative-drug operations.
#[derive(Debug, Clone)]
pub struct AlternativeRepository {
    pool: SqlitePool,
}

impl AlternativeRepository {
    /// Creates a new AlternativeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AlternativeRepository { pool }
    }

    /// Alternatives suggested for `drug_id`, oldest first.
    pub async fn for_drug(&self, drug_id: i64) -> DbResult<Vec<DrugAlternative>> {
        let alternatives = sqlx::query_as::<_, DrugAlternative>(&format!(
            "{SELECT_ALTERNATIVE} WHERE alt.drug_id = ?1 ORDER BY alt.id"
        ))
        .bind(drug_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alternatives)
    }

    /// ## Returns
    /// * `Err(DbError::NotFound)` - Either drug doesn't exist
    pub async fn create(&self, input: &NewAlternative) -> DbResult<DrugAlternative> {
        debug!(
            drug_id = %input.drug_id,
            alternative_drug_id = %input.alternative_drug_id,
            "Creating alternative"
        );

        ensure_exists(&self.pool, "drugs", "Drug", input.drug_id).await?;
        ensure_exists(&self.pool, "drugs", "Drug", input.alternative_drug_id).await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO drug_alternatives (
                drug_id, alternative_drug_id, note, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(input.drug_id)
        .bind(input.alternative_drug_id)
        .bind(&input.note)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        sqlx::query_as::<_, DrugAlternative>(&format!("{SELECT_ALTERNATIVE} WHERE alt.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("DrugAlternative", id))
    }

    /// Removes one suggestion by its own id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No such suggestion
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting alternative");

        let result = sqlx::query("DELETE FROM drug_alternatives WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("DrugAlternative", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
