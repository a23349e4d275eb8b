//! # logi-core: Pure Business Logic for Logi
//!
//! This crate is the heart of the logistics ledger. It holds the record
//! model, the derived-field calculator and the dashboard aggregation as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Logi Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Console shell (`logi` CLI)                     │   │
//! │  │      new ──► dashboard ──► history / edit / delete ──► rates    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ logi-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ calculator│  │  report   │  │ validation│  │   │
//! │  │   │ Operation │  │  compute  │  │ summarize │  │   rules   │  │   │
//! │  │   │   Rates   │  │  derived  │  │ Dashboard │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    logi-db (SQLite)                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived Fields
//! Every record carries the rates it was created under. Derived fields are
//! always recomputed from that snapshot, never from the current rates:
//! ```text
//! cc_services  = packages  × cc_rate
//! adimex_calc  = weight_kg × adimex_rate
//! total_costs  = crew + forklift + yale + extraordinary + subcontract
//! adimex_diff  = adimex_calc − adimex_paid
//! service_diff = cc_services − total_costs
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use logi_core::Money` instead of
// `use logi_core::money::Money`

pub use calculator::compute;
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use report::{summarize, Dashboard};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest receipt PDF accepted for a single record (16 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 16 * 1024 * 1024;

/// Maximum length of free-text fields (master references, freight and truck type).
pub const MAX_TEXT_LEN: usize = 100;

/// Month labels offered by the entry form, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];
