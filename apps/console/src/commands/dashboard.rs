//! # Dashboard Command
//!
//! Reads the filtered record set and aggregates it. An empty selection is
//! a valid, all-zero dashboard.

use serde::Serialize;
use tracing::debug;

use crate::error::AppResult;
use logi_core::validation::validate_filter;
use logi_core::{summarize, Dashboard, RecordFilter};
use logi_db::Database;

/// Dashboard plus the filter it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub filter: RecordFilter,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

pub async fn load_dashboard(db: &Database, filter: RecordFilter) -> AppResult<DashboardReport> {
    validate_filter(&filter)?;

    let records = db.operations().list_all(&filter).await?;
    let dashboard = summarize(&records);

    debug!(
        records = dashboard.totals.records,
        months = dashboard.by_month.len(),
        "load_dashboard command"
    );

    Ok(DashboardReport { filter, dashboard })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::operation::create_operation;
    use chrono::NaiveDate;
    use logi_core::{Money, OperationInput};
    use logi_db::DbConfig;

    fn input(master: &str, month: &str, lm: NaiveDate, crew: f64) -> OperationInput {
        OperationInput {
            month: month.to_string(),
            first_mile_date: lm,
            first_mile_master: master.to_string(),
            last_mile_date: lm,
            last_mile_master: String::new(),
            boxes: 1,
            packages: 10,
            weight_kg: 2.0,
            crew_size: 1,
            crew_cost: Money::new(crew),
            forklift_cost: Money::zero(),
            yale_cost: Money::zero(),
            extraordinary_cost: Money::zero(),
            freight_type: String::new(),
            truck_type: String::new(),
            subcontract_freight_cost: Money::zero(),
            adimex_paid: Money::new(0.5),
        }
    }

    #[tokio::test]
    async fn test_empty_store_is_all_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let report = load_dashboard(&db, RecordFilter::All).await.unwrap();

        assert!(report.dashboard.is_empty());
        assert!(report.dashboard.totals.net_margin.is_zero());
        assert!(report.dashboard.expenses.total().is_zero());
        assert!(report.dashboard.by_month.is_empty());
    }

    #[tokio::test]
    async fn test_filtered_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let jan = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let feb = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        create_operation(&db, input("FM-1", "Enero", jan, 10.0), None)
            .await
            .unwrap();
        create_operation(&db, input("FM-2", "Febrero", feb, 20.0), None)
            .await
            .unwrap();

        let all = load_dashboard(&db, RecordFilter::All).await.unwrap();
        assert_eq!(all.dashboard.totals.records, 2);
        assert_eq!(all.dashboard.by_month.len(), 2);

        let feb_only = load_dashboard(
            &db,
            RecordFilter::MonthYear {
                month: 2,
                year: 2026,
            },
        )
        .await
        .unwrap();
        let totals = feb_only.dashboard.totals;
        assert_eq!(totals.records, 1);
        assert_eq!(totals.packages, 10);
        assert!((totals.total_costs.amount() - 20.0).abs() < 1e-9);
        assert!((totals.cc_services.amount() - 8.4).abs() < 1e-9);
        assert!((totals.net_margin.amount() - (8.4 - 20.0)).abs() < 1e-9);
        assert_eq!(feb_only.dashboard.by_month[0].month, "Febrero");
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let filter = RecordFilter::DateRange {
            from: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };
        assert!(load_dashboard(&db, filter).await.is_err());
    }
}
