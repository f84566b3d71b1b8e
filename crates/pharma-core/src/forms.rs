//! # Forms
//!
//! Every HTML form PharmaShelf accepts, in two shapes:
//!
//! ```text
//! ┌──────────────────────┐  validation::parse_*  ┌──────────────────────┐
//! │  Raw form (Strings)  │ ────────────────────► │  Typed input         │
//! │  DrugForm            │                       │  NewDrug             │
//! │  stock_quantity: "7" │   Err(FieldErrors)    │  stock_quantity: 7   │
//! │  category_id: "2"    │ ◄──────────────────── │  category_id: 2      │
//! └──────────────────────┘                       └──────────────────────┘
//! ```
//!
//! Raw forms decode whatever the browser sent; a missing field decodes as an
//! empty string so the validators can report it. Typed inputs are what the
//! repositories accept, so no handler ever re-parses a string.

use serde::Deserialize;

use crate::types::Role;

// =============================================================================
// Account Forms
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Admin edit of another user's role and active flag.
///
/// `is_active` is a checkbox: present (any value) means active.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdateForm {
    pub role: String,
    pub is_active: Option<String>,
}

/// The profile page posts two different forms to the same URL;
/// `form_type` is `"profile"` or `"password"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub form_type: String,
    pub name: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// =============================================================================
// Catalog Forms
// =============================================================================

/// Create and edit form for a drug.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DrugForm {
    pub name: String,
    pub active_ingredient: String,
    pub dosage_form: String,
    pub indications: String,
    pub side_effects: String,
    pub stock_quantity: String,
    pub category_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StockUpdateForm {
    pub stock_quantity: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InteractionForm {
    pub drug_a_id: String,
    pub drug_b_id: String,
    pub severity: String,
    pub description: String,
}

/// `drug_id` comes from a hidden input on the details page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlternativeForm {
    pub drug_id: String,
    pub alternative_drug_id: String,
    pub note: String,
}

// =============================================================================
// Query Strings
// =============================================================================

/// `GET /drugs?q=&category_id=&in_stock_only=on&page=2`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DrugListQuery {
    pub q: Option<String>,
    pub category_id: Option<String>,
    pub in_stock_only: Option<String>,
    pub page: Option<String>,
}

/// `GET /interactions/check?drug_a_id=1&drug_b_id=2`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InteractionQuery {
    pub drug_a_id: Option<String>,
    pub drug_b_id: Option<String>,
}

impl InteractionQuery {
    /// Both ids present and numeric. Anything else means "nothing checked yet".
    pub fn pair(&self) -> Option<(i64, i64)> {
        let a = self.drug_a_id.as_deref()?.trim().parse().ok()?;
        let b = self.drug_b_id.as_deref()?.trim().parse().ok()?;
        Some((a, b))
    }
}

// =============================================================================
// Drug List Filter
// =============================================================================

/// The three optional predicates of the drug list.
///
/// Applied in order: name substring, category, in-stock. An unset predicate
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugFilter {
    /// Case-insensitive substring of the drug name.
    pub search: Option<String>,
    pub category_id: Option<i64>,
    /// Only drugs with `stock_quantity > 0`.
    pub in_stock_only: bool,
}

impl From<&DrugListQuery> for DrugFilter {
    /// A category id that does not parse (or is not positive) is ignored
    /// rather than rejected; the list simply is not narrowed by category.
    fn from(query: &DrugListQuery) -> Self {
        let search = query
            .q
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        let category_id = query
            .category_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|id| *id > 0);

        DrugFilter {
            search,
            category_id,
            in_stock_only: query.in_stock_only.as_deref() == Some("on"),
        }
    }
}

// =============================================================================
// Typed Inputs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUserUpdate {
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// A validated drug, used both to create and to update the details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrug {
    pub name: String,
    pub active_ingredient: String,
    pub dosage_form: String,
    pub indications: String,
    pub side_effects: String,
    pub stock_quantity: i64,
    pub category_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInteraction {
    pub drug_a_id: i64,
    pub drug_b_id: i64,
    pub severity: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlternative {
    pub drug_id: i64,
    pub alternative_drug_id: i64,
    pub note: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn query(q: Option<&str>, category: Option<&str>, in_stock: Option<&str>) -> DrugListQuery {
        DrugListQuery {
            q: q.map(String::from),
            category_id: category.map(String::from),
            in_stock_only: in_stock.map(String::from),
            page: None,
        }
    }

    #[test]
    fn test_filter_from_empty_query() {
        let filter = DrugFilter::from(&DrugListQuery::default());
        assert_eq!(filter, DrugFilter::default());
    }

    #[test]
    fn test_filter_ignores_bad_category() {
        assert_eq!(DrugFilter::from(&query(None, Some("abc"), None)).category_id, None);
        assert_eq!(DrugFilter::from(&query(None, Some(""), None)).category_id, None);
        assert_eq!(DrugFilter::from(&query(None, Some("0"), None)).category_id, None);
        assert_eq!(DrugFilter::from(&query(None, Some("3"), None)).category_id, Some(3));
    }

    #[test]
    fn test_filter_in_stock_requires_on() {
        assert!(DrugFilter::from(&query(None, None, Some("on"))).in_stock_only);
        assert!(!DrugFilter::from(&query(None, None, Some("true"))).in_stock_only);
    }

    #[test]
    fn test_filter_keeps_search_text() {
        let filter = DrugFilter::from(&query(Some("Para"), None, None));
        assert_eq!(filter.search.as_deref(), Some("Para"));
        assert_eq!(DrugFilter::from(&query(Some(""), None, None)).search, None);
    }

    #[test]
    fn test_interaction_query_pair() {
        let q = InteractionQuery {
            drug_a_id: Some("1".into()),
            drug_b_id: Some("2".into()),
        };
        assert_eq!(q.pair(), Some((1, 2)));

        let missing = InteractionQuery {
            drug_a_id: Some("1".into()),
            drug_b_id: Some(String::new()),
        };
        assert_eq!(missing.pair(), None);

        let garbage = InteractionQuery {
            drug_a_id: Some("x".into()),
            drug_b_id: Some("2".into()),
        };
        assert_eq!(garbage.pair(), None);
    }

    #[test]
    fn test_missing_form_fields_decode_empty() {
        let form: DrugForm = serde_json::from_str(r#"{"name":"Ibuprofen"}"#).unwrap();
        assert_eq!(form.name, "Ibuprofen");
        assert!(form.stock_quantity.is_empty());
        assert!(form.category_id.is_empty());
    }
}
