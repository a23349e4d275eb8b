//! Plain-text rendering of command results, plus the `--json` encoder.

use serde::Serialize;

use crate::commands::dashboard::DashboardReport;
use crate::commands::operation::{DeleteOutcome, OperationDto};
use crate::error::AppResult;
use logi_core::{Money, OperationSummary, RateChange, Rates, RecordFilter};

/// Pretty-printed JSON for `--json`.
pub fn json<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn money(amount: Money) -> String {
    format!("{:>14}", amount.to_string())
}

/// Human description of a filter, used as a report heading.
pub fn filter_label(filter: &RecordFilter) -> String {
    match filter {
        RecordFilter::All => "all records".to_string(),
        RecordFilter::MonthYear { month, year } => format!("{:04}-{:02}", year, month),
        RecordFilter::DateRange { from, to } => format!("{} to {}", from, to),
    }
}

pub fn operation(op: &OperationDto) -> String {
    let receipt = match &op.receipt {
        Some(r) => format!("{} ({} bytes)", r.filename, r.size_bytes),
        None => "none".to_string(),
    };

    [
        format!("Operation #{}  ({})", op.id, op.month),
        format!(
            "  First mile    {}  {}",
            op.first_mile_date, op.first_mile_master
        ),
        format!(
            "  Last mile     {}  {}",
            op.last_mile_date, op.last_mile_master
        ),
        format!(
            "  Cargo         {} boxes, {} packages, {} kg",
            op.boxes, op.packages, op.weight_kg
        ),
        format!(
            "  Transport     freight: {}  truck: {}",
            op.freight_type, op.truck_type
        ),
        format!("  Crew          {} people", op.crew_size),
        String::new(),
        format!("  Crew cost              {}", money(op.crew_cost)),
        format!("  Forklift               {}", money(op.forklift_cost)),
        format!("  Yale                   {}", money(op.yale_cost)),
        format!("  Extraordinary service  {}", money(op.extraordinary_cost)),
        format!(
            "  Subcontracted freight  {}",
            money(op.subcontract_freight_cost)
        ),
        format!("  Total operating cost   {}", money(op.total_costs)),
        String::new(),
        format!("  CC services            {}", money(op.cc_services)),
        format!("  Service difference     {}", money(op.service_diff)),
        format!("  ADIMEX calculated      {}", money(op.adimex_calc)),
        format!("  ADIMEX paid            {}", money(op.adimex_paid)),
        format!("  ADIMEX difference      {}", money(op.adimex_diff)),
        String::new(),
        format!(
            "  Rates (snapshot)  CC {} / package, ADIMEX {} / kg",
            op.cc_rate, op.adimex_rate
        ),
        format!("  Receipt           {}", receipt),
        format!(
            "  Created {}  Updated {}",
            op.created_at.format("%Y-%m-%d %H:%M"),
            op.updated_at.format("%Y-%m-%d %H:%M")
        ),
    ]
    .join("\n")
}

pub fn history(rows: &[OperationSummary]) -> String {
    if rows.is_empty() {
        return "No operations found.".to_string();
    }

    let mut lines = vec![format!(
        "{:>6}  {:<11}  {:<18}  {:<18}  {:>14}  {}",
        "ID", "Month", "FM master", "LM master", "Total cost", "Receipt"
    )];
    lines.extend(rows.iter().map(|row| {
        format!(
            "{:>6}  {:<11}  {:<18}  {:<18}  {}  {}",
            row.id,
            row.month,
            row.first_mile_master,
            row.last_mile_master,
            money(row.total_costs),
            row.attachment_name.as_deref().unwrap_or("-")
        )
    }));
    lines.push(format!("{} operation(s)", rows.len()));
    lines.join("\n")
}

pub fn dashboard(report: &DashboardReport) -> String {
    let totals = &report.dashboard.totals;
    let expenses = &report.dashboard.expenses;

    let mut lines = vec![
        format!(
            "Dashboard: {} ({} records)",
            filter_label(&report.filter),
            totals.records
        ),
        String::new(),
        "ADIMEX control".to_string(),
        format!("  Calculated         {}", money(totals.adimex_calc)),
        format!("  Paid               {}", money(totals.adimex_paid)),
        format!("  Difference         {}", money(totals.adimex_diff)),
        String::new(),
        "CC profitability".to_string(),
        format!("  CC revenue         {}", money(totals.cc_services)),
        format!("  Operating cost     {}", money(totals.total_costs)),
        format!("  Net margin         {}", money(totals.net_margin)),
        format!(
            "  Volume             {} packages, {} kg",
            totals.packages, totals.weight_kg
        ),
        String::new(),
        "Expense breakdown".to_string(),
    ];

    let total = expenses.total().amount();
    for (label, amount) in expenses.buckets() {
        let share = if total > 0.0 {
            amount.amount() / total * 100.0
        } else {
            0.0
        };
        lines.push(format!("  {:<22} {}  {:>5.1}%", label, money(amount), share));
    }

    if !report.dashboard.by_month.is_empty() {
        lines.push(String::new());
        lines.push("Per month".to_string());
        for group in &report.dashboard.by_month {
            lines.push(format!(
                "  {:<12} {:>5} records  {}",
                group.month,
                group.records,
                money(group.total_costs)
            ));
        }
    }

    lines.join("\n")
}

pub fn rates(rates: &Rates) -> String {
    format!(
        "CC rate:     {} per package\nADIMEX rate: {} per kg",
        rates.cc_rate, rates.adimex_rate
    )
}

pub fn rate_change(change: &RateChange) -> String {
    format!(
        "{}  CC {} -> {}  ADIMEX {} -> {}",
        change.changed_at.format("%Y-%m-%d %H:%M:%S"),
        change.previous_cc_rate,
        change.new_cc_rate,
        change.previous_adimex_rate,
        change.new_adimex_rate
    )
}

pub fn rate_history(changes: &[RateChange]) -> String {
    if changes.is_empty() {
        return "No rate changes recorded.".to_string();
    }
    changes
        .iter()
        .map(rate_change)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn deleted(outcome: &DeleteOutcome) -> String {
    match outcome.removed {
        0 => "Nothing to delete.".to_string(),
        1 => "Deleted 1 operation.".to_string(),
        n => format!("Deleted {} operations.", n),
    }
}
