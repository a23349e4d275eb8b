//! # Derived-Field Calculator
//!
//! Maps raw operation input and a rate pair to the derived monetary fields.
//!
//! ## Where The Rates Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  New record:   live rates (RateRepository::current_rates) ──┐           │
//! │                                                             ▼           │
//! │                                                  compute(input, rates)  │
//! │                                                             ▲           │
//! │  Edit:         the record's own stored snapshot ────────────┘           │
//! │                                                                         │
//! │  The calculator never looks anything up itself.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator does no validation: zero packages or zero weight are
//! valid and produce zero revenue / zero ADIMEX cost. Negative inputs are
//! rejected earlier, by [`crate::validation`].

use crate::money::Money;
use crate::types::{DerivedFields, OperationInput, Rates};

/// Computes every derived field of a record.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use logi_core::{compute, Money, OperationInput, Rates};
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
/// let input = OperationInput {
///     month: "Enero".into(),
///     first_mile_date: day,
///     first_mile_master: "FM-1".into(),
///     last_mile_date: day,
///     last_mile_master: "LM-1".into(),
///     boxes: 3,
///     packages: 100,
///     weight_kg: 50.0,
///     crew_size: 2,
///     crew_cost: Money::new(200.0),
///     forklift_cost: Money::new(50.0),
///     yale_cost: Money::new(30.0),
///     extraordinary_cost: Money::zero(),
///     freight_type: "Local".into(),
///     truck_type: "Torton".into(),
///     subcontract_freight_cost: Money::new(20.0),
///     adimex_paid: Money::new(15.0),
/// };
///
/// let derived = compute(&input, Rates::DEFAULT);
/// assert_eq!(derived.total_costs.to_string(), "$300.00");
/// assert_eq!(derived.service_diff.to_string(), "-$216.00");
/// ```
pub fn compute(input: &OperationInput, rates: Rates) -> DerivedFields {
    let cc_services = Money::new(input.packages as f64 * rates.cc_rate);
    let adimex_calc = Money::new(input.weight_kg * rates.adimex_rate);
    let total_costs = total_costs(input);

    DerivedFields {
        cc_services,
        adimex_calc,
        total_costs,
        adimex_diff: adimex_calc - input.adimex_paid,
        service_diff: cc_services - total_costs,
    }
}

/// Operating cost of a record: exactly crew, forklift, yale, extraordinary
/// service and subcontracted freight. No other field contributes.
pub fn total_costs(input: &OperationInput) -> Money {
    input.crew_cost
        + input.forklift_cost
        + input.yale_cost
        + input.extraordinary_cost
        + input.subcontract_freight_cost
}

// =============================================================================
// Unit Tests
// =============================================================================
