//! # Interaction Repository
//!
//! Database operations for drug-drug interactions.
//!
//! ## Symmetric Lookup
//! ```text
//! stored:  (Warfarin, Aspirin, "Severe")
//!
//! between(Warfarin, Aspirin) → rows stored as (Warfarin, Aspirin)
//! between(Aspirin, Warfarin) → nothing as (Aspirin, Warfarin)
//!                              → fall back to (Warfarin, Aspirin)
//! ```
//! The reverse direction is only consulted when the requested direction has
//! no rows, so a pair recorded both ways reports the requested direction only.

use chrono::Utc;
use pharma_core::forms::NewInteraction;
use pharma_core::DrugInteraction;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::ensure_exists;

const SELECT_INTERACTION: &str = r#"
    SELECT
        i.id,
        i.drug_a_id,
        a.name AS drug_a_name,
        i.drug_b_id,
        b.name AS drug_b_name,
        i.severity,
        i.description,
        i.created_at,
        i.updated_at
    FROM drug_interactions i
    INNER JOIN drugs a ON a.id = i.drug_a_id
    INNER JOIN drugs b ON b.id = i.drug_b_id
"#;

/// Repository for interaction database operations.
#[derive(Debug, Clone)]
pub struct InteractionRepository {
    pool: SqlitePool,
}

impl InteractionRepository {
    /// Creates a new InteractionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InteractionRepository { pool }
    }

    /// Records an interaction between two drugs.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Either drug doesn't exist
    pub async fn create(&self, input: &NewInteraction) -> DbResult<DrugInteraction> {
        debug!(
            drug_a_id = %input.drug_a_id,
            drug_b_id = %input.drug_b_id,
            severity = %input.severity,
            "Creating interaction"
        );

        ensure_exists(&self.pool, "drugs", "Drug", input.drug_a_id).await?;
        ensure_exists(&self.pool, "drugs", "Drug", input.drug_b_id).await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO drug_interactions (
                drug_a_id, drug_b_id, severity, description, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(input.drug_a_id)
        .bind(input.drug_b_id)
        .bind(&input.severity)
        .bind(&input.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        sqlx::query_as::<_, DrugInteraction>(&format!("{SELECT_INTERACTION} WHERE i.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("DrugInteraction", id))
    }

    /// Interactions recorded for the pair, in either direction.
    pub async fn between(&self, drug_a_id: i64, drug_b_id: i64) -> DbResult<Vec<DrugInteraction>> {
        let forward = self.directed(drug_a_id, drug_b_id).await?;
        if !forward.is_empty() {
            return Ok(forward);
        }

        self.directed(drug_b_id, drug_a_id).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM drug_interactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn directed(&self, drug_a_id: i64, drug_b_id: i64) -> DbResult<Vec<DrugInteraction>> {
        let interactions = sqlx::query_as::<_, DrugInteraction>(&format!(
            "{SELECT_INTERACTION} WHERE i.drug_a_id = ?1 AND i.drug_b_id = ?2 ORDER BY i.id"
        ))
        .bind(drug_a_id)
        .bind(drug_b_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(interactions)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
