//! # Domain Types
//!
//! Records stored by PharmaShelf and the read models the pages display.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Category     │   │      Drug       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │◄──│  category_id    │       │
//! │  │  email (unique) │   │  name           │   │  stock_quantity │       │
//! │  │  role?          │◄──┼─────────────────┼───│  created_by_id  │       │
//! │  │  is_active      │   │  description    │   │  indications    │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                        │                │
//! │              ┌─────────────────────────────────────────┤                │
//! │              ▼                                         ▼                │
//! │  ┌─────────────────────┐                 ┌─────────────────────┐       │
//! │  │  DrugInteraction    │                 │  DrugAlternative    │       │
//! │  │  drug_a ≠ drug_b    │                 │  drug ≠ alternative │       │
//! │  │  symmetric lookup   │                 │  directional        │       │
//! │  └─────────────────────┘                 └─────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read Models
//! Rows that reference other rows also carry the display name of what they
//! reference (`category_name`, `drug_a_name`, ...). Repositories fill these
//! in with a join so templates never need a second lookup.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// Role
// =============================================================================

/// Staff role. A freshly registered user has no role until an admin assigns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access: catalog edits, user management, out-of-stock mail.
    Admin,
    /// Day-to-day staff: stock updates, interactions, alternatives.
    Pharmacist,
}

impl Role {
    /// Stored / submitted form of the role.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pharmacist => "pharmacist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "pharmacist" => Ok(Role::Pharmacist),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A staff account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Login identifier, unique across users.
    pub email: String,

    /// Argon2 PHC string. Never serialized into page contexts.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// `None` until an admin assigns a role.
    pub role: Option<Role>,

    /// Disabled accounts cannot log in.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Only admins may edit the catalog or manage users.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

// =============================================================================
// Category
// =============================================================================

/// A drug category. `description` is an empty string when not provided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category together with how many drugs belong to it.
///
/// Used by the categories page and the dashboard statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategoryDrugCount {
    pub category_id: i64,
    pub name: String,
    pub drug_count: i64,
}

// =============================================================================
// Drug
// =============================================================================

/// A drug record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Drug {
    pub id: i64,
    pub name: String,
    pub active_ingredient: String,

    /// e.g. "Tablet", "Syrup", "Injection".
    pub dosage_form: String,

    /// At least 10 characters.
    pub indications: String,

    /// Empty when not provided.
    pub side_effects: String,

    /// Units on hand. Never negative (also a SQL CHECK).
    pub stock_quantity: i64,

    /// User who created the record.
    pub created_by_id: i64,

    pub category_id: i64,

    /// Joined from `categories.name`.
    pub category_name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Drug Interaction
// =============================================================================

/// A recorded interaction between two distinct drugs.
///
/// Lookups are symmetric: (A, B) and (B, A) describe the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DrugInteraction {
    pub id: i64,
    pub drug_a_id: i64,
    pub drug_a_name: String,
    pub drug_b_id: i64,
    pub drug_b_name: String,

    /// Free text, e.g. "Mild", "Moderate", "Severe".
    pub severity: String,

    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Drug Alternative
// =============================================================================

/// A suggested substitute for a drug. Directional: A → B says nothing about B → A.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DrugAlternative {
    pub id: i64,
    pub drug_id: i64,
    pub alternative_drug_id: i64,
    pub alternative_drug_name: String,

    /// Stock of the alternative, so the details page can flag empty shelves.
    pub alternative_stock_quantity: i64,

    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn drug_with_stock(stock_quantity: i64) -> Drug {
        let now = Utc::now();
        Drug {
            id: 1,
            name: "Amoxicillin".to_string(),
            active_ingredient: "Amoxicillin trihydrate".to_string(),
            dosage_form: "Capsule".to_string(),
            indications: "Bacterial infections".to_string(),
            side_effects: String::new(),
            stock_quantity,
            created_by_id: 1,
            category_id: 1,
            category_name: "Antibiotics".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().ok(), Some(Role::Admin));
        assert_eq!("pharmacist".parse::<Role>().ok(), Some(Role::Pharmacist));
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert_eq!(Role::Pharmacist.to_string(), "pharmacist");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_drug_serializes_joined_category() {
        let json = serde_json::to_value(drug_with_stock(0)).unwrap();
        assert_eq!(json["stock_quantity"], 0);
        assert_eq!(json["category_name"], "Antibiotics");
    }
}
