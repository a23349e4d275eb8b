//! # Repository Module
//!
//! Database repository implementations for Logi.
//!
//! ```text
//! console command
//!       │  db.operations().update(id, &patch)
//!       │  db.rates().current_rates()
//!       ▼
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │ OperationRepository  │   │ RateRepository       │
//! │ operations table     │   │ rate_config          │
//! │                      │   │ rate_changes (log)   │
//! └──────────────────────┘   └──────────────────────┘
//!       │                           │
//!       └───────────► SQLite ◄──────┘
//! ```
//!
//! - [`OperationRepository`](operation::OperationRepository) - record CRUD, filters, receipts
//! - [`RateRepository`](rates::RateRepository) - live rates and change history

pub mod operation;
pub mod rates;
