//! # Dashboard Aggregation
//!
//! Read-side sums and groupings over a set of operation records.
//!
//! ## Dashboard Sections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ADIMEX control       calculated │ paid │ difference                    │
//! │  CC profitability     CC revenue │ operating cost │ net margin          │
//! │  Expense breakdown    crew │ forklift │ yale │ extraordinary │ freight  │
//! │  Per month            record count │ operating cost                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An empty record set is not an error: every sum is zero and the
//! per-month grouping is empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;
use crate::types::OperationRecord;

// =============================================================================
// Totals
// =============================================================================

/// Column sums over the filtered record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardTotals {
    pub records: usize,
    pub cc_services: Money,
    pub total_costs: Money,
    pub adimex_calc: Money,
    pub adimex_paid: Money,
    pub adimex_diff: Money,
    pub service_diff: Money,
    /// Sum of CC revenue minus sum of operating cost.
    pub net_margin: Money,
    pub packages: i64,
    pub weight_kg: f64,
}

// =============================================================================
// Expense Breakdown
// =============================================================================

/// Operating cost split into its five buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseBreakdown {
    pub crew: Money,
    pub forklift: Money,
    pub yale: Money,
    pub extraordinary: Money,
    pub subcontract_freight: Money,
}

impl ExpenseBreakdown {
    /// Buckets in display order, with their chart labels.
    pub fn buckets(&self) -> [(&'static str, Money); 5] {
        [
            ("Crew", self.crew),
            ("Forklift", self.forklift),
            ("Yale", self.yale),
            ("Extraordinary service", self.extraordinary),
            ("Subcontracted freight", self.subcontract_freight),
        ]
    }

    pub fn total(&self) -> Money {
        self.buckets().iter().map(|(_, amount)| *amount).sum()
    }
}

// =============================================================================
// Monthly Grouping
// =============================================================================

/// Records and operating cost grouped under one month label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyGroup {
    pub month: String,
    pub records: usize,
    pub total_costs: Money,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    pub totals: DashboardTotals,
    pub expenses: ExpenseBreakdown,
    /// Sorted by month label.
    pub by_month: Vec<MonthlyGroup>,
}

impl Dashboard {
    /// True when no record matched the filter.
    pub fn is_empty(&self) -> bool {
        self.totals.records == 0
    }
}

/// Aggregates a record set into dashboard figures.
///
/// ## Example
/// ```rust
/// use logi_core::summarize;
///
/// let dashboard = summarize(&[]);
/// assert!(dashboard.is_empty());
/// assert!(dashboard.totals.net_margin.is_zero());
/// assert!(dashboard.by_month.is_empty());
/// ```
pub fn summarize(records: &[OperationRecord]) -> Dashboard {
    let mut totals = DashboardTotals::default();
    let mut expenses = ExpenseBreakdown::default();
    let mut months: BTreeMap<&str, (usize, Money)> = BTreeMap::new();

    for record in records {
        let input = &record.input;
        let derived = &record.derived;

        totals.records += 1;
        totals.cc_services += derived.cc_services;
        totals.total_costs += derived.total_costs;
        totals.adimex_calc += derived.adimex_calc;
        totals.adimex_paid += input.adimex_paid;
        totals.adimex_diff += derived.adimex_diff;
        totals.service_diff += derived.service_diff;
        totals.packages = totals.packages.saturating_add(input.packages);
        totals.weight_kg += input.weight_kg;

        expenses.crew += input.crew_cost;
        expenses.forklift += input.forklift_cost;
        expenses.yale += input.yale_cost;
        expenses.extraordinary += input.extraordinary_cost;
        expenses.subcontract_freight += input.subcontract_freight_cost;

        let entry = months
            .entry(input.month.as_str())
            .or_insert((0, Money::zero()));
        entry.0 += 1;
        entry.1 += derived.total_costs;
    }

    totals.net_margin = totals.cc_services - totals.total_costs;

    let by_month = months
        .into_iter()
        .map(|(month, (records, total_costs))| MonthlyGroup {
            month: month.to_string(),
            records,
            total_costs,
        })
        .collect();

    Dashboard {
        totals,
        expenses,
        by_month,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
