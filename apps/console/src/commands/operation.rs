//! # Operation Commands
//!
//! Record entry, lookup, history, edit, delete and receipt retrieval.
//!
//! ## Edit Semantics
//! ```text
//! edit 12 --packages 200
//!      │
//!      ▼
//! validate_patch ──► db.operations().update(12, patch)
//!                         │
//!                         └─ derived fields recomputed with the rates
//!                            stored on record 12, never the live rates
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use logi_core::validation::{
    validate_attachment, validate_filter, validate_operation_input, validate_patch,
};
use logi_core::{
    compute, Attachment, AttachmentKey, CoreError, Money, OperationInput, OperationPatch,
    OperationRecord, OperationSummary, RecordFilter,
};
use logi_db::Database;

// =============================================================================
// DTOs
// =============================================================================

/// Operation DTO for output.
///
/// Carries the receipt's name and size but never its bytes; `pdf` fetches
/// those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDto {
    pub id: i64,
    pub month: String,
    pub first_mile_date: NaiveDate,
    pub first_mile_master: String,
    pub last_mile_date: NaiveDate,
    pub last_mile_master: String,
    pub boxes: i64,
    pub packages: i64,
    pub weight_kg: f64,
    pub crew_size: i64,
    pub crew_cost: Money,
    pub forklift_cost: Money,
    pub yale_cost: Money,
    pub extraordinary_cost: Money,
    pub freight_type: String,
    pub truck_type: String,
    pub subcontract_freight_cost: Money,
    pub adimex_paid: Money,
    pub cc_services: Money,
    pub adimex_calc: Money,
    pub total_costs: Money,
    pub adimex_diff: Money,
    pub service_diff: Money,
    /// Rate snapshot the derived fields were computed with.
    pub cc_rate: f64,
    pub adimex_rate: f64,
    pub receipt: Option<ReceiptInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptInfo {
    pub filename: String,
    pub size_bytes: usize,
}

impl From<OperationRecord> for OperationDto {
    fn from(r: OperationRecord) -> Self {
        let receipt = r.attachment.as_ref().map(|a| ReceiptInfo {
            filename: a.filename.clone(),
            size_bytes: a.len(),
        });
        let OperationInput {
            month,
            first_mile_date,
            first_mile_master,
            last_mile_date,
            last_mile_master,
            boxes,
            packages,
            weight_kg,
            crew_size,
            crew_cost,
            forklift_cost,
            yale_cost,
            extraordinary_cost,
            freight_type,
            truck_type,
            subcontract_freight_cost,
            adimex_paid,
        } = r.input;

        OperationDto {
            id: r.id,
            month,
            first_mile_date,
            first_mile_master,
            last_mile_date,
            last_mile_master,
            boxes,
            packages,
            weight_kg,
            crew_size,
            crew_cost,
            forklift_cost,
            yale_cost,
            extraordinary_cost,
            freight_type,
            truck_type,
            subcontract_freight_cost,
            adimex_paid,
            cc_services: r.derived.cc_services,
            adimex_calc: r.derived.adimex_calc,
            total_costs: r.derived.total_costs,
            adimex_diff: r.derived.adimex_diff,
            service_diff: r.derived.service_diff,
            cc_rate: r.rates.cc_rate,
            adimex_rate: r.rates.adimex_rate,
            receipt,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Result of a delete command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    /// Rows removed; 0 when nothing matched.
    pub removed: u64,
}

// =============================================================================
// Commands
// =============================================================================

/// Records a new operation with the live rates.
///
/// ## Steps
/// 1. Validate the raw fields (and the receipt, if any)
/// 2. Read the live rates (defaults if the config is unreadable)
/// 3. Compute derived fields
/// 4. Insert raw + derived + rate snapshot + receipt
pub async fn create_operation(
    db: &Database,
    input: OperationInput,
    attachment: Option<Attachment>,
) -> AppResult<OperationDto> {
    validate_operation_input(&input)?;
    if let Some(attachment) = &attachment {
        validate_attachment(attachment)?;
    }

    let rates = db.rates().current_rates().await;
    let derived = compute(&input, rates);

    debug!(
        master = %input.first_mile_master,
        cc_rate = rates.cc_rate,
        adimex_rate = rates.adimex_rate,
        "create_operation command"
    );

    let id = db
        .operations()
        .insert(&input, &derived, rates, attachment.as_ref())
        .await?;

    info!(id, total_costs = %derived.total_costs, "Operation recorded");
    get_operation(db, id).await
}

/// Gets one operation, or `NOT_FOUND`.
pub async fn get_operation(db: &Database, id: i64) -> AppResult<OperationDto> {
    debug!(id, "get_operation command");
    let record = db
        .operations()
        .get(id)
        .await?
        .ok_or(CoreError::OperationNotFound(id))?;
    Ok(OperationDto::from(record))
}

/// History table rows for a filter.
pub async fn list_history(
    db: &Database,
    filter: &RecordFilter,
) -> AppResult<Vec<OperationSummary>> {
    validate_filter(filter)?;
    let rows = db.operations().list_summaries(filter).await?;
    debug!(count = rows.len(), "list_history command");
    Ok(rows)
}

/// Applies a partial edit. Derived fields are recomputed from the record's
/// own rate snapshot.
pub async fn edit_operation(
    db: &Database,
    id: i64,
    patch: OperationPatch,
) -> AppResult<OperationDto> {
    if patch.is_empty() {
        return Err(CoreError::EmptyPatch(id).into());
    }
    validate_patch(&patch)?;

    let record = db.operations().update(id, &patch).await?;
    Ok(OperationDto::from(record))
}

/// Deletes one operation. A missing id removes nothing and is not an error.
pub async fn delete_operation(db: &Database, id: i64) -> AppResult<DeleteOutcome> {
    let removed = db.operations().delete(id).await?;
    info!(id, removed, "delete_operation command");
    Ok(DeleteOutcome { removed })
}

/// Deletes every operation with this first-mile master.
pub async fn delete_by_master(db: &Database, master: &str) -> AppResult<DeleteOutcome> {
    let master = master.trim();
    if master.is_empty() {
        return Err(AppError::validation("master reference is required"));
    }
    let removed = db.operations().delete_by_reference(master).await?;
    info!(master, removed, "delete_by_master command");
    Ok(DeleteOutcome { removed })
}

/// Fetches a stored receipt, or `NOT_FOUND` when none is on file.
pub async fn fetch_receipt(db: &Database, key: &AttachmentKey) -> AppResult<Attachment> {
    db.operations()
        .get_attachment(key)
        .await?
        .ok_or_else(|| match key {
            AttachmentKey::Id(id) => AppError::not_found("Receipt for operation", id),
            AttachmentKey::MasterRef(master) => AppError::not_found("Receipt for master", master),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use logi_core::Rates;
    use logi_db::DbConfig;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn input(master: &str) -> OperationInput {
        OperationInput {
            month: "Marzo".to_string(),
            first_mile_date: day(1),
            first_mile_master: master.to_string(),
            last_mile_date: day(5),
            last_mile_master: "LM-1".to_string(),
            boxes: 4,
            packages: 100,
            weight_kg: 50.0,
            crew_size: 3,
            crew_cost: Money::new(200.0),
            forklift_cost: Money::new(50.0),
            yale_cost: Money::new(30.0),
            extraordinary_cost: Money::zero(),
            freight_type: "Nacional".to_string(),
            truck_type: "Torton".to_string(),
            subcontract_freight_cost: Money::new(20.0),
            adimex_paid: Money::new(15.0),
        }
    }

    fn close(a: Money, b: f64) -> bool {
        (a.amount() - b).abs() < 1e-9
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_reference_scenario() {
        let db = db().await;
        let dto = create_operation(&db, input("FM-1"), None).await.unwrap();

        assert!(close(dto.cc_services, 84.0));
        assert!(close(dto.adimex_calc, 17.5));
        assert!(close(dto.total_costs, 300.0));
        assert!(close(dto.adimex_diff, 2.5));
        assert!(close(dto.service_diff, -216.0));
        assert_eq!(dto.cc_rate, 0.84);
        assert!(dto.receipt.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_negative_and_bad_receipt() {
        let db = db().await;

        let mut raw = input("FM-2");
        raw.packages = -1;
        let err = create_operation(&db, raw, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let png = Attachment::new("receipt.png", vec![1]);
        let err = create_operation(&db, input("FM-2"), Some(png))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(db.operations().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_uses_live_rates() {
        let db = db().await;
        db.rates().update_rates(Rates::new(1.0, 0.4)).await.unwrap();

        let dto = create_operation(&db, input("FM-3"), None).await.unwrap();

        assert!(close(dto.cc_services, 100.0));
        assert!(close(dto.adimex_calc, 20.0));
        assert_eq!(dto.cc_rate, 1.0);
    }

    #[tokio::test]
    async fn test_edit_keeps_original_rates() {
        let db = db().await;
        let created = create_operation(&db, input("FM-4"), None).await.unwrap();
        db.rates().update_rates(Rates::new(1.0, 0.4)).await.unwrap();

        let patch = OperationPatch {
            packages: Some(50),
            ..Default::default()
        };
        let edited = edit_operation(&db, created.id, patch).await.unwrap();

        assert!(close(edited.cc_services, 50.0 * 0.84));
        assert_eq!(edited.cc_rate, 0.84);
        assert_eq!(edited.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_edit_errors() {
        let db = db().await;

        let err = edit_operation(&db, 1, OperationPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let patch = OperationPatch {
            boxes: Some(2),
            ..Default::default()
        };
        let err = edit_operation(&db, 77, patch).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_show_missing_is_not_found() {
        let db = db().await;
        let err = get_operation(&db, 5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let db = db().await;
        let dto = create_operation(&db, input("FM-5"), None).await.unwrap();

        assert_eq!(delete_operation(&db, dto.id).await.unwrap().removed, 1);
        assert_eq!(delete_operation(&db, dto.id).await.unwrap().removed, 0);
        assert_eq!(delete_by_master(&db, "FM-5").await.unwrap().removed, 0);
        assert!(delete_by_master(&db, "  ").await.is_err());
    }

    #[tokio::test]
    async fn test_receipt_round_trip() {
        let db = db().await;
        let pdf = Attachment::new("factura.pdf", b"%PDF-1.4".to_vec());
        let dto = create_operation(&db, input("FM-6"), Some(pdf.clone()))
            .await
            .unwrap();

        assert_eq!(
            dto.receipt,
            Some(ReceiptInfo {
                filename: "factura.pdf".to_string(),
                size_bytes: 8,
            })
        );
        assert_eq!(
            fetch_receipt(&db, &AttachmentKey::Id(dto.id)).await.unwrap(),
            pdf
        );
        assert_eq!(
            fetch_receipt(&db, &AttachmentKey::MasterRef("FM-6".to_string()))
                .await
                .unwrap(),
            pdf
        );

        let err = fetch_receipt(&db, &AttachmentKey::Id(999))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_history_filter_validation() {
        let db = db().await;
        create_operation(&db, input("FM-7"), None).await.unwrap();

        let march = RecordFilter::MonthYear {
            month: 3,
            year: 2026,
        };
        assert_eq!(list_history(&db, &march).await.unwrap().len(), 1);

        let bad = RecordFilter::MonthYear {
            month: 13,
            year: 2026,
        };
        let err = list_history(&db, &bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
