//! # pharma-core: Pure Business Logic for PharmaShelf
//!
//! This crate holds everything in PharmaShelf that can be decided without
//! touching the database or the network: record types, form validation,
//! drug-list pagination and the dashboard aggregation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PharmaShelf Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser (server-rendered pages)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pharma-web handlers                          │   │
//! │  │    login, drugs, stock update, interactions, dashboard          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ pharma-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   forms   │  │pagination │  │ dashboard │  │   │
//! │  │   │   Drug    │  │ DrugForm  │  │ Pagination│  │ top cats  │  │   │
//! │  │   │   User    │  │ NewDrug   │  │           │  │ chart     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                       validation                                │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pharma-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records (User, Category, Drug, DrugInteraction, DrugAlternative)
//! - [`forms`] - Raw form structs and their typed, validated counterparts
//! - [`validation`] - Field validators returning [`FieldErrors`]
//! - [`pagination`] - Page arithmetic for the drug list
//! - [`dashboard`] - Summary counts, category percentages, chart series
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pharma_core::forms::StockUpdateForm;
//! use pharma_core::validation::validate_stock_update;
//!
//! let form = StockUpdateForm { stock_quantity: "abc".to_string() };
//! let errors = validate_stock_update(&form);
//! assert_eq!(errors.get("stock_quantity"), Some("Stock quantity must be a number."));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dashboard;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, FieldError, FieldErrors};
pub use pagination::Pagination;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of drugs shown per page on the drug list.
pub const PAGE_SIZE: i64 = 5;

/// Drugs with `0 < stock_quantity <= LOW_STOCK_THRESHOLD` are "low stock".
///
/// Zero is not low stock, it is out of stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// How many categories the dashboard ranks before folding the rest into
/// [`OTHER_BUCKET_LABEL`].
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// Chart label for the categories outside the top [`TOP_CATEGORY_LIMIT`].
pub const OTHER_BUCKET_LABEL: &str = "Other";
