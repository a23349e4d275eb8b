//! # logi-db: Database Layer for Logi
//!
//! SQLite persistence for operation records, the live rate configuration
//! and the rate change log, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Logi Data Flow                                 │
//! │                                                                         │
//! │  logi console (new / edit / dashboard / rates ...)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     logi-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌───────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations   │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)   │  │   │
//! │  │   │               │    │ OperationRepo  │   │ 001_operations│  │   │
//! │  │   │ SqlitePool    │◄───│ RateRepo       │   │ 002_rates     │  │   │
//! │  │   └───────────────┘    └────────────────┘   └───────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (default: platform data dir / logi.db)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use logi_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("logi.db")).await?;
//!
//! let rates = db.rates().current_rates().await;
//! let derived = logi_core::compute(&input, rates);
//! let id = db.operations().insert(&input, &derived, rates, None).await?;
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

pub use repository::operation::OperationRepository;
pub use repository::rates::RateRepository;
