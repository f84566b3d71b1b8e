//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WebError (in pharma-web)                                              │
//! │       │                                                                 │
//! │       ├── NotFound      → 404 page                                     │
//! │       └── anything else → logged, 500 page                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// Only the cases a caller acts on get their own variant. Everything else
/// (connection, pool, migration, CHECK failures) is `Internal` and ends up
/// as a logged 500.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - A write targets an id that doesn't exist
    /// - A drug references a missing user, category or drug
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Registering an email that is already in `users`
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Any other database failure.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound                 → DbError::NotFound
/// sqlx::Error::Database (unique violation) → DbError::UniqueViolation
///                                            field = "users.email"
/// Other                                    → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            // "UNIQUE constraint failed: users.email"
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                let field = db_err
                    .message()
                    .strip_prefix("UNIQUE constraint failed: ")
                    .unwrap_or("unknown")
                    .to_string();
                DbError::UniqueViolation {
                    field,
                    value: "unknown".to_string(),
                }
            }

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Internal(format!("migration failed: {}", err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Drug", 42);
        assert_eq!(err.to_string(), "Drug not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_row_not_found_maps() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_other_failures_are_internal() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::Internal(_)));

        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::Internal(_)));

        let err: DbError = sqlx::migrate::MigrateError::VersionMissing(3).into();
        assert!(err.to_string().contains("migration failed"));
    }
}
