//! # pharma-db: Database Layer for PharmaShelf
//!
//! This crate provides database access for PharmaShelf.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PharmaShelf Data Flow                             │
//! │                                                                         │
//! │  Request handler (POST /drugs/{id}/stock/update)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pharma-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo       │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CategoryRepo   │   │ 001_initial  │  │   │
//! │  │   │ Connection    │    │ DrugRepo       │   │   _schema    │  │   │
//! │  │   │ Management    │    │ InteractionRepo│   │              │  │   │
//! │  │   │               │    │ AlternativeRepo│   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`password`] - Argon2 password hashing
//! - [`repository`] - One repository per table
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharma_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("pharmashelf.db")).await?;
//! let low = db.drugs().low_stock(pharma_core::LOW_STOCK_THRESHOLD).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::alternative::AlternativeRepository;
pub use repository::category::CategoryRepository;
pub use repository::drug::DrugRepository;
pub use repository::interaction::InteractionRepository;
pub use repository::user::UserRepository;
