//! # Validation Module
//!
//! Form validation for PharmaShelf.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form decoding (axum Form / Query)                            │
//! │  └── Missing fields decode as empty strings                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── validate_*: every rule runs, all failures reported                │
//! │  └── parse_*:    validate, then convert into a typed input             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (users.email)                                              │
//! │  ├── CHECK (stock_quantity >= 0, distinct drug pairs)                  │
//! │  └── Foreign keys with ON DELETE CASCADE                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lengths
//! All length rules count characters, not bytes, so "Ñu" is two characters.
//! Values are checked as submitted; only numeric fields are trimmed before
//! they are parsed.
//!
//! ## Usage
//! ```rust
//! use pharma_core::forms::InteractionForm;
//! use pharma_core::validation::validate_interaction;
//!
//! let form = InteractionForm {
//!     drug_a_id: "4".into(),
//!     drug_b_id: "4".into(),
//!     severity: "Severe".into(),
//!     description: String::new(),
//! };
//! let errors = validate_interaction(&form);
//! assert_eq!(
//!     errors.get("drug_b_id"),
//!     Some("Select two different drugs for an interaction.")
//! );
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FieldErrors;
use crate::forms::{
    AdminUserUpdate, AlternativeForm, CategoryForm, DrugForm, InteractionForm, NewAlternative,
    NewCategory, NewDrug, NewInteraction, PasswordChange, ProfileForm, Registration,
    RegistrationForm, StockUpdateForm, UserUpdateForm,
};
use crate::types::Role;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.+_-]+@[a-zA-Z0-9._-]+\.[a-zA-Z]+$").expect("email pattern is valid")
});

#[inline]
fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Optional text: empty is fine, anything shorter than `min` is not.
#[inline]
fn too_short_if_present(value: &str, min: usize) -> bool {
    let len = char_len(value);
    len > 0 && len < min
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a signup form.
///
/// ## Arguments
/// * `form` - The submitted form
/// * `email_taken` - Whether a user with this email already exists. Only
///   consulted once the email is present and well-formed.
///
/// ## Rules
/// - name: at least 2 characters
/// - email: required, well-formed, not registered
/// - password: at least 8 characters, equal to `confirm_password`
pub fn validate_registration(form: &RegistrationForm, email_taken: bool) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if char_len(&form.name) < 2 {
        errors.add("name", "Name must be at least 2 characters long.");
    }

    if form.email.is_empty() {
        errors.add("email", "Email is required.");
    } else if !EMAIL_REGEX.is_match(&form.email) {
        errors.add("email", "Invalid email format.");
    } else if email_taken {
        errors.add("email", "This email is already registered.");
    }

    if char_len(&form.password) < 8 {
        errors.add("password", "Password must be at least 8 characters long.");
    }

    if form.password != form.confirm_password {
        errors.add("confirm_password", "Password and confirmation do not match.");
    }

    errors
}

pub fn parse_registration(
    form: &RegistrationForm,
    email_taken: bool,
) -> Result<Registration, FieldErrors> {
    validate_registration(form, email_taken).into_result(Registration {
        name: form.name.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
    })
}

/// Validates an admin's role / active-flag change.
pub fn validate_user_update(form: &UserUpdateForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.role.is_empty() {
        errors.add("role", "Role is required.");
    } else if form.role.parse::<Role>().is_err() {
        errors.add("role", "Invalid role.");
    }

    errors
}

pub fn parse_user_update(form: &UserUpdateForm) -> Result<AdminUserUpdate, FieldErrors> {
    let errors = validate_user_update(form);
    match form.role.parse::<Role>() {
        Ok(role) if errors.is_empty() => Ok(AdminUserUpdate {
            role,
            is_active: form.is_active.is_some(),
        }),
        _ => Err(errors),
    }
}

pub fn validate_profile_update(form: &ProfileForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if form.name.is_empty() {
        errors.add("name", "Name is required.");
    }
    errors
}

/// Validates the password half of the profile page.
///
/// Whether `current_password` is actually correct is checked by the caller
/// against the stored hash, after these rules pass.
pub fn validate_password_change(form: &ProfileForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.current_password.is_empty() {
        errors.add("current_password", "Current password is required.");
    }
    if char_len(&form.new_password) < 8 {
        errors.add("new_password", "Password must be at least 8 characters.");
    }
    if form.new_password != form.confirm_password {
        errors.add("confirm_password", "Passwords do not match.");
    }

    errors
}

pub fn parse_password_change(form: &ProfileForm) -> Result<PasswordChange, FieldErrors> {
    validate_password_change(form).into_result(PasswordChange {
        current_password: form.current_password.clone(),
        new_password: form.new_password.clone(),
    })
}

// =============================================================================
// Stock Quantity
// =============================================================================

/// Checks a non-empty stock value, returning the parsed quantity when valid.
fn check_stock_quantity(raw: &str, errors: &mut FieldErrors) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(qty) if qty < 0 => {
            errors.add("stock_quantity", "Stock quantity cannot be negative.");
            None
        }
        Ok(qty) => Some(qty),
        Err(_) => {
            errors.add("stock_quantity", "Stock quantity must be a number.");
            None
        }
    }
}

/// Parses a positive database id. Empty or garbage yields `None`.
fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates the create / edit drug form.
///
/// ## Rules
/// - name, active_ingredient, dosage_form: required
/// - indications: at least 10 characters
/// - side_effects: empty, or at least 5 characters
/// - stock_quantity: empty (means 0), or a non-negative integer
/// - category_id: a valid id
pub fn validate_drug(form: &DrugForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.name.is_empty() {
        errors.add("name", "Drug name is required.");
    }
    if form.active_ingredient.is_empty() {
        errors.add("active_ingredient", "Active ingredient is required.");
    }
    if form.dosage_form.is_empty() {
        errors.add("dosage_form", "Dosage form is required.");
    }
    if char_len(&form.indications) < 10 {
        errors.add(
            "indications",
            "Indications should be at least 10 characters long.",
        );
    }
    if too_short_if_present(&form.side_effects, 5) {
        errors.add(
            "side_effects",
            "Side effects should be at least 5 characters long if provided.",
        );
    }
    if !form.stock_quantity.is_empty() {
        check_stock_quantity(&form.stock_quantity, &mut errors);
    }
    if parse_id(&form.category_id).is_none() {
        errors.add("category_id", "Category is required.");
    }

    errors
}

pub fn parse_drug(form: &DrugForm) -> Result<NewDrug, FieldErrors> {
    let errors = validate_drug(form);
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut errors = FieldErrors::new();
    let stock_quantity = if form.stock_quantity.is_empty() {
        0
    } else {
        match check_stock_quantity(&form.stock_quantity, &mut errors) {
            Some(qty) => qty,
            None => return Err(errors),
        }
    };
    let Some(category_id) = parse_id(&form.category_id) else {
        errors.add("category_id", "Category is required.");
        return Err(errors);
    };

    Ok(NewDrug {
        name: form.name.clone(),
        active_ingredient: form.active_ingredient.clone(),
        dosage_form: form.dosage_form.clone(),
        indications: form.indications.clone(),
        side_effects: form.side_effects.clone(),
        stock_quantity,
        category_id,
    })
}

/// Validates a stock-only update. Unlike the drug form, empty is an error.
pub fn validate_stock_update(form: &StockUpdateForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if form.stock_quantity.is_empty() {
        errors.add("stock_quantity", "Stock quantity is required.");
    } else {
        check_stock_quantity(&form.stock_quantity, &mut errors);
    }
    errors
}

/// Returns the new stock quantity.
pub fn parse_stock_update(form: &StockUpdateForm) -> Result<i64, FieldErrors> {
    let mut errors = validate_stock_update(form);
    if !errors.is_empty() {
        return Err(errors);
    }
    check_stock_quantity(&form.stock_quantity, &mut errors).ok_or(errors)
}

pub fn validate_category(form: &CategoryForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.name.is_empty() {
        errors.add("name", "Category name is required.");
    }
    if too_short_if_present(&form.description, 3) {
        errors.add(
            "description",
            "Description should be at least 3 characters long if provided.",
        );
    }

    errors
}

pub fn parse_category(form: &CategoryForm) -> Result<NewCategory, FieldErrors> {
    validate_category(form).into_result(NewCategory {
        name: form.name.clone(),
        description: form.description.clone(),
    })
}

// =============================================================================
// Relationship Validators
// =============================================================================

/// Validates a new drug interaction.
///
/// Equal ids are compared as submitted strings. The "different drugs"
/// message replaces "Second drug is required." on `drug_b_id`.
pub fn validate_interaction(form: &InteractionForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.drug_a_id.is_empty() {
        errors.add("drug_a_id", "First drug is required.");
    }
    if form.drug_b_id.is_empty() {
        errors.add("drug_b_id", "Second drug is required.");
    }
    if !form.drug_a_id.is_empty()
        && !form.drug_b_id.is_empty()
        && form.drug_a_id == form.drug_b_id
    {
        errors.add("drug_b_id", "Select two different drugs for an interaction.");
    }
    if form.severity.is_empty() {
        errors.add("severity", "Severity is required.");
    }
    if too_short_if_present(&form.description, 5) {
        errors.add(
            "description",
            "Description should be at least 5 characters long if provided.",
        );
    }

    errors
}

/// Validates and converts an interaction form.
///
/// Ids that pass the presence rules but are not numbers are reported with
/// the field's "required" message.
pub fn parse_interaction(form: &InteractionForm) -> Result<NewInteraction, FieldErrors> {
    let mut errors = validate_interaction(form);
    let drug_a_id = parse_id(&form.drug_a_id);
    let drug_b_id = parse_id(&form.drug_b_id);

    if drug_a_id.is_none() && !errors.contains("drug_a_id") {
        errors.add("drug_a_id", "First drug is required.");
    }
    if drug_b_id.is_none() && !errors.contains("drug_b_id") {
        errors.add("drug_b_id", "Second drug is required.");
    }

    match (drug_a_id, drug_b_id) {
        (Some(drug_a_id), Some(drug_b_id)) if errors.is_empty() => {
            if drug_a_id == drug_b_id {
                // "07" and "7" are different strings but the same drug
                errors.add("drug_b_id", "Select two different drugs for an interaction.");
                return Err(errors);
            }
            Ok(NewInteraction {
                drug_a_id,
                drug_b_id,
                severity: form.severity.clone(),
                description: form.description.clone(),
            })
        }
        _ => Err(errors),
    }
}

/// Validates a new alternative suggestion.
pub fn validate_alternative(form: &AlternativeForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.alternative_drug_id.is_empty() {
        errors.add("alternative_drug_id", "Alternative drug is required.");
    }
    if form.drug_id.is_empty() {
        errors.add("drug_id", "Main drug is required.");
    }
    if !form.drug_id.is_empty()
        && !form.alternative_drug_id.is_empty()
        && form.drug_id == form.alternative_drug_id
    {
        errors.add("alternative_drug_id", "Alternative must be a different drug.");
    }
    if too_short_if_present(&form.note, 3) {
        errors.add(
            "note",
            "Note should be at least 3 characters long if provided.",
        );
    }

    errors
}

pub fn parse_alternative(form: &AlternativeForm) -> Result<NewAlternative, FieldErrors> {
    let mut errors = validate_alternative(form);
    let drug_id = parse_id(&form.drug_id);
    let alternative_drug_id = parse_id(&form.alternative_drug_id);

    if alternative_drug_id.is_none() && !errors.contains("alternative_drug_id") {
        errors.add("alternative_drug_id", "Alternative drug is required.");
    }
    if drug_id.is_none() && !errors.contains("drug_id") {
        errors.add("drug_id", "Main drug is required.");
    }

    match (drug_id, alternative_drug_id) {
        (Some(drug_id), Some(alternative_drug_id)) if errors.is_empty() => {
            if drug_id == alternative_drug_id {
                errors.add("alternative_drug_id", "Alternative must be a different drug.");
                return Err(errors);
            }
            Ok(NewAlternative {
                drug_id,
                alternative_drug_id,
                note: form.note.clone(),
            })
        }
        _ => Err(errors),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
