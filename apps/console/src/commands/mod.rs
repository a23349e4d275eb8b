//! # Console Commands
//!
//! The command layer behind each `logi` subcommand. Functions take a
//! `&Database` and typed arguments and return DTOs; they know nothing about
//! argument parsing or terminal output.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── operation.rs  ◄─── new / show / history / edit / delete / pdf
//! ├── dashboard.rs  ◄─── dashboard aggregation
//! └── rates.rs      ◄─── rates show / history / set (admin gated)
//! ```
//!
//! ## New-Record Flow
//! ```text
//! validate input ──► db.rates().current_rates() ──► compute(input, rates)
//!                                                          │
//!                    db.operations().insert(input, derived, rates, pdf)
//! ```

pub mod dashboard;
pub mod operation;
pub mod rates;
