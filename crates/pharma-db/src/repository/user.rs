//! # User Repository
//!
//! Database operations for staff accounts.
//!
//! ## Account Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Account Lifecycle                                 │
//! │                                                                         │
//! │  1. SIGNUP                                                             │
//! │     └── create() → User { role: None, is_active: true }                │
//! │                                                                         │
//! │  2. ADMIN REVIEW                                                       │
//! │     └── update_from_admin() → role = admin | pharmacist, active flag   │
//! │                                                                         │
//! │  3. SELF SERVICE                                                       │
//! │     ├── update_name()                                                  │
//! │     └── update_password()                                              │
//! │                                                                         │
//! │  Disabled accounts keep their row; login refuses them.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use pharma_core::dashboard::UserBreakdown;
use pharma_core::{Role, User};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_USER: &str = r#"
    SELECT id, name, email, password_hash, role, is_active, created_at, updated_at
    FROM users
"#;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new account with no role.
    ///
    /// ## Arguments
    /// * `password_hash` - Already hashed (see [`crate::password::hash_password`])
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn create(&self, name: &str, email: &str, password_hash: &str) -> DbResult<User> {
        debug!(email = %email, "Creating user");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, NULL, 1, ?4, ?4)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, email),
            other => other,
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Exact, case-sensitive match on the stored email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE email = ?1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// All users in signup order.
    pub async fn list_all(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Sets role and active flag on behalf of an admin.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No such user
    pub async fn update_from_admin(&self, id: i64, role: Role, is_active: bool) -> DbResult<User> {
        debug!(id = %id, role = %role, is_active = is_active, "Updating user from admin");

        let result = sqlx::query(
            "UPDATE users SET role = ?2, is_active = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(role)
        .bind(is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.updated(id, result.rows_affected()).await
    }

    pub async fn update_name(&self, id: i64, name: &str) -> DbResult<User> {
        debug!(id = %id, "Updating user name");

        let result = sqlx::query("UPDATE users SET name = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        self.updated(id, result.rows_affected()).await
    }

    /// Replaces the stored hash. The caller hashes the new password.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> DbResult<User> {
        debug!(id = %id, "Updating user password");

        let result =
            sqlx::query("UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(password_hash)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        self.updated(id, result.rows_affected()).await
    }

    /// Emails of every admin, active or not, skipping empty addresses.
    pub async fn admin_emails(&self) -> DbResult<Vec<String>> {
        let emails: Vec<String> = sqlx::query_scalar(
            "SELECT email FROM users WHERE role = 'admin' AND email <> '' ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = emails.len(), "Loaded admin emails");
        Ok(emails)
    }

    /// Counts for the admin section of the dashboard.
    pub async fn role_breakdown(&self) -> DbResult<UserBreakdown> {
        let breakdown = sqlx::query_as::<_, UserBreakdown>(
            r#"
            SELECT
                COUNT(*)                                              AS total,
                COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0)  AS active,
                COALESCE(SUM(CASE WHEN is_active = 0 THEN 1 ELSE 0 END), 0)  AS disabled,
                COALESCE(SUM(CASE WHEN role = 'admin' THEN 1 ELSE 0 END), 0) AS admins,
                COALESCE(SUM(CASE WHEN role = 'pharmacist' THEN 1 ELSE 0 END), 0) AS pharmacists
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(breakdown)
    }

    async fn updated(&self, id: i64, rows_affected: u64) -> DbResult<User> {
        if rows_affected == 0 {
            return Err(DbError::not_found("User", id));
        }
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
