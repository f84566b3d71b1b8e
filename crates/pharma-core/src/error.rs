//! # Error Types
//!
//! Domain-specific error types for pharma-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharma-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── FieldErrors      - Every failing form field, in rule order        │
//! │                                                                         │
//! │  pharma-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  pharma-web errors (in app)                                            │
//! │  └── WebError         - Redirects, 404 and 500 pages                   │
//! │                                                                         │
//! │  Flow: FieldErrors → flash messages; DbError → WebError → Response     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why FieldErrors is not an enum
//! A submitted form can fail several rules at once and the user must see
//! all of them. Validators never stop at the first failure, so the natural
//! result is an ordered collection of `(field, message)` pairs.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored or submitted role is not one of `admin` / `pharmacist`.
    #[error("Invalid role: {0}")]
    InvalidRole(String),
}

// =============================================================================
// Field Errors
// =============================================================================

/// One failing form field and the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Ordered mapping of field name → human-readable message.
///
/// Empty means the form is valid. Adding a second message for a field that
/// already failed replaces the first one, keeping the field's position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{} invalid field(s)", .entries.len())]
pub struct FieldErrors {
    entries: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|e| e.field == field) {
            Some(existing) => existing.message = message,
            None => self.entries.push(FieldError { field, message }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.entries.iter()
    }

    /// Messages in the order the rules produced them.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }

    /// `Ok(value)` when no field failed, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
