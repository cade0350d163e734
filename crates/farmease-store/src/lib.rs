//! # farmease-store: Local Storage Layer for FarmEase
//!
//! Everything the storefront persists on the local machine lives behind
//! this crate, in a single SQLite file accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        FarmEase Data Flow                               │
//! │                                                                         │
//! │  CartStore::add_item / SessionState::sign_in / local catalog lookups   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  farmease-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ StorageRepository  │  │ (embedded) │  │   │
//! │  │   │  SqlitePool   │    │ ProductRepository  │  │            │  │   │
//! │  │   │               │    │ ProfileRepository  │  │            │  │   │
//! │  │   │               │    │ FeedbackRepository │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite: <platform data dir>/farmease/farmease.db              │   │
//! │  │   client_storage (cart, session)   products (local catalog)     │   │
//! │  │   profiles (local accounts)        feedback (customer ratings)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Client storage, product catalog, profiles and feedback
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farmease_store::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("farmease.db")).await?;
//!
//! db.storage().set("cart", "[]").await?;
//! let levels = db.products().stock_levels(&ids).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::feedback::{FeedbackRepository, NewFeedback};
pub use repository::product::ProductRepository;
pub use repository::profile::{Profile, ProfileRepository};
pub use repository::storage::StorageRepository;
