//! # Operation Repository
//!
//! Database operations for shipment records.
//!
//! ## Key Operations
//! - Insert a record with its derived fields and rate snapshot
//! - Partial edits that recompute derived fields inside one transaction
//! - Delete by id or by first-mile master
//! - Filtered bulk reads for the history table and the dashboard
//! - Receipt PDF lookup by id or master
//!
//! ## Edit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    SELECT row (raw fields + cc_rate/adimex_rate snapshot)              │
//! │    patch.apply_to(raw)                                                 │
//! │    compute(raw, snapshot)        ← snapshot, NOT the live config       │
//! │    UPDATE raw + derived (+ receipt only when the patch carries one)    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use logi_core::{
    compute, Attachment, AttachmentKey, DerivedFields, Money, OperationInput, OperationPatch,
    OperationRecord, OperationSummary, Rates, RecordFilter,
};

/// Column list shared by every full-record SELECT.
macro_rules! operation_columns {
    () => {
        "id, month, first_mile_date, first_mile_master, last_mile_date, last_mile_master, \
         boxes, packages, weight_kg, crew_size, crew_cost, forklift_cost, yale_cost, \
         extraordinary_cost, freight_type, truck_type, subcontract_freight_cost, adimex_paid, \
         cc_services, adimex_calc, total_costs, adimex_diff, service_diff, \
         cc_rate, adimex_rate, attachment_name, attachment, created_at, updated_at"
    };
}

macro_rules! summary_columns {
    () => {
        "id, month, first_mile_master, last_mile_master, total_costs, attachment_name"
    };
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Flat row shape of the `operations` table.
#[derive(Debug, sqlx::FromRow)]
struct OperationRow {
    id: i64,
    month: String,
    first_mile_date: NaiveDate,
    first_mile_master: String,
    last_mile_date: NaiveDate,
    last_mile_master: String,
    boxes: i64,
    packages: i64,
    weight_kg: f64,
    crew_size: i64,
    crew_cost: Money,
    forklift_cost: Money,
    yale_cost: Money,
    extraordinary_cost: Money,
    freight_type: String,
    truck_type: String,
    subcontract_freight_cost: Money,
    adimex_paid: Money,
    cc_services: Money,
    adimex_calc: Money,
    total_costs: Money,
    adimex_diff: Money,
    service_diff: Money,
    cc_rate: f64,
    adimex_rate: f64,
    attachment_name: Option<String>,
    attachment: Option<Vec<u8>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OperationRow> for OperationRecord {
    fn from(row: OperationRow) -> Self {
        let attachment = match (row.attachment_name, row.attachment) {
            (Some(filename), Some(bytes)) => Some(Attachment::new(filename, bytes)),
            _ => None,
        };

        OperationRecord {
            id: row.id,
            input: OperationInput {
                month: row.month,
                first_mile_date: row.first_mile_date,
                first_mile_master: row.first_mile_master,
                last_mile_date: row.last_mile_date,
                last_mile_master: row.last_mile_master,
                boxes: row.boxes,
                packages: row.packages,
                weight_kg: row.weight_kg,
                crew_size: row.crew_size,
                crew_cost: row.crew_cost,
                forklift_cost: row.forklift_cost,
                yale_cost: row.yale_cost,
                extraordinary_cost: row.extraordinary_cost,
                freight_type: row.freight_type,
                truck_type: row.truck_type,
                subcontract_freight_cost: row.subcontract_freight_cost,
                adimex_paid: row.adimex_paid,
            },
            derived: DerivedFields {
                cc_services: row.cc_services,
                adimex_calc: row.adimex_calc,
                total_costs: row.total_costs,
                adimex_diff: row.adimex_diff,
                service_diff: row.service_diff,
            },
            rates: Rates::new(row.cc_rate, row.adimex_rate),
            attachment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for operation record database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.operations();
///
/// let id = repo.insert(&input, &derived, rates, None).await?;
/// let record = repo.get(id).await?;
/// let march = repo.list_all(&RecordFilter::MonthYear { month: 3, year: 2026 }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OperationRepository {
    pool: SqlitePool,
}

impl OperationRepository {
    /// Creates a new OperationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OperationRepository { pool }
    }

    /// Inserts a new record and returns its surrogate id.
    ///
    /// The caller computes `derived` with `rates`; both are stored as given.
    pub async fn insert(
        &self,
        input: &OperationInput,
        derived: &DerivedFields,
        rates: Rates,
        attachment: Option<&Attachment>,
    ) -> DbResult<i64> {
        let now = Utc::now();

        debug!(master = %input.first_mile_master, "Inserting operation");

        let result = sqlx::query(
            r#"
            INSERT INTO operations (
                month, first_mile_date, first_mile_master, last_mile_date, last_mile_master,
                boxes, packages, weight_kg, crew_size, crew_cost, forklift_cost, yale_cost,
                extraordinary_cost, freight_type, truck_type, subcontract_freight_cost, adimex_paid,
                cc_services, adimex_calc, total_costs, adimex_diff, service_diff,
                cc_rate, adimex_rate, attachment_name, attachment, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?27
            )
            "#,
        )
        .bind(&input.month)
        .bind(input.first_mile_date)
        .bind(&input.first_mile_master)
        .bind(input.last_mile_date)
        .bind(&input.last_mile_master)
        .bind(input.boxes)
        .bind(input.packages)
        .bind(input.weight_kg)
        .bind(input.crew_size)
        .bind(input.crew_cost)
        .bind(input.forklift_cost)
        .bind(input.yale_cost)
        .bind(input.extraordinary_cost)
        .bind(&input.freight_type)
        .bind(&input.truck_type)
        .bind(input.subcontract_freight_cost)
        .bind(input.adimex_paid)
        .bind(derived.cc_services)
        .bind(derived.adimex_calc)
        .bind(derived.total_costs)
        .bind(derived.adimex_diff)
        .bind(derived.service_diff)
        .bind(rates.cc_rate)
        .bind(rates.adimex_rate)
        .bind(attachment.map(|a| a.filename.as_str()))
        .bind(attachment.map(|a| a.bytes.as_slice()))
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, master = %input.first_mile_master, "Operation saved");
        Ok(id)
    }

    /// Applies a partial edit and recomputes every derived field from the
    /// record's stored rate snapshot.
    ///
    /// The receipt is replaced only when the patch carries one.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no record with this id
    pub async fn update(&self, id: i64, patch: &OperationPatch) -> DbResult<OperationRecord> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OperationRow> = sqlx::query_as(concat!(
            "SELECT ",
            operation_columns!(),
            " FROM operations WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut record: OperationRecord = row
            .ok_or_else(|| DbError::not_found("Operation", id))?
            .into();

        patch.apply_to(&mut record.input);
        record.derived = compute(&record.input, record.rates);
        record.updated_at = Utc::now();
        if let Some(attachment) = &patch.attachment {
            record.attachment = Some(attachment.clone());
        }

        let input = &record.input;
        let derived = &record.derived;
        let replacement = patch.attachment.as_ref();

        sqlx::query(
            r#"
            UPDATE operations SET
                month = ?2,
                first_mile_date = ?3,
                first_mile_master = ?4,
                last_mile_date = ?5,
                last_mile_master = ?6,
                boxes = ?7,
                packages = ?8,
                weight_kg = ?9,
                crew_size = ?10,
                crew_cost = ?11,
                forklift_cost = ?12,
                yale_cost = ?13,
                extraordinary_cost = ?14,
                freight_type = ?15,
                truck_type = ?16,
                subcontract_freight_cost = ?17,
                adimex_paid = ?18,
                cc_services = ?19,
                adimex_calc = ?20,
                total_costs = ?21,
                adimex_diff = ?22,
                service_diff = ?23,
                attachment_name = COALESCE(?24, attachment_name),
                attachment = COALESCE(?25, attachment),
                updated_at = ?26
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.month)
        .bind(input.first_mile_date)
        .bind(&input.first_mile_master)
        .bind(input.last_mile_date)
        .bind(&input.last_mile_master)
        .bind(input.boxes)
        .bind(input.packages)
        .bind(input.weight_kg)
        .bind(input.crew_size)
        .bind(input.crew_cost)
        .bind(input.forklift_cost)
        .bind(input.yale_cost)
        .bind(input.extraordinary_cost)
        .bind(&input.freight_type)
        .bind(&input.truck_type)
        .bind(input.subcontract_freight_cost)
        .bind(input.adimex_paid)
        .bind(derived.cc_services)
        .bind(derived.adimex_calc)
        .bind(derived.total_costs)
        .bind(derived.adimex_diff)
        .bind(derived.service_diff)
        .bind(replacement.map(|a| a.filename.as_str()))
        .bind(replacement.map(|a| a.bytes.as_slice()))
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            id,
            receipt_replaced = replacement.is_some(),
            "Operation updated"
        );
        Ok(record)
    }

    /// Deletes one record. Returns the number of rows removed (0 when the
    /// id doesn't exist).
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM operations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id, removed = result.rows_affected(), "Deleted operation");
        Ok(result.rows_affected())
    }

    /// Deletes every record carrying this first-mile master reference.
    pub async fn delete_by_reference(&self, master: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM operations WHERE first_mile_master = ?1")
            .bind(master)
            .execute(&self.pool)
            .await?;

        debug!(
            master,
            removed = result.rows_affected(),
            "Deleted operations by master"
        );
        Ok(result.rows_affected())
    }

    /// Gets a record by id, receipt included.
    ///
    /// ## Returns
    /// * `Ok(Some(record))` - found
    /// * `Ok(None)` - no record with this id
    pub async fn get(&self, id: i64) -> DbResult<Option<OperationRecord>> {
        let row: Option<OperationRow> = sqlx::query_as(concat!(
            "SELECT ",
            operation_columns!(),
            " FROM operations WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OperationRecord::from))
    }

    /// Fetches a stored receipt.
    ///
    /// By master reference, the lowest-id record that has a receipt wins.
    pub async fn get_attachment(&self, key: &AttachmentKey) -> DbResult<Option<Attachment>> {
        let row: Option<(Option<String>, Option<Vec<u8>>)> = match key {
            AttachmentKey::Id(id) => {
                sqlx::query_as("SELECT attachment_name, attachment FROM operations WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            AttachmentKey::MasterRef(master) => {
                sqlx::query_as(
                    r#"
                    SELECT attachment_name, attachment
                    FROM operations
                    WHERE first_mile_master = ?1 AND attachment IS NOT NULL
                    ORDER BY id
                    LIMIT 1
                    "#,
                )
                .bind(master)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(match row {
            Some((Some(filename), Some(bytes))) => Some(Attachment::new(filename, bytes)),
            _ => None,
        })
    }

    /// Lists full records matching the filter, oldest first.
    pub async fn list_all(&self, filter: &RecordFilter) -> DbResult<Vec<OperationRecord>> {
        let rows: Vec<OperationRow> = match filter.date_bounds()? {
            None => {
                sqlx::query_as(concat!(
                    "SELECT ",
                    operation_columns!(),
                    " FROM operations ORDER BY id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            Some((first, last)) => {
                sqlx::query_as(concat!(
                    "SELECT ",
                    operation_columns!(),
                    " FROM operations WHERE last_mile_date BETWEEN ?1 AND ?2 ORDER BY id"
                ))
                .bind(first)
                .bind(last)
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(count = rows.len(), ?filter, "Listed operations");
        Ok(rows.into_iter().map(OperationRecord::from).collect())
    }

    /// Lists the history-table projection (no receipt bytes), oldest first.
    pub async fn list_summaries(&self, filter: &RecordFilter) -> DbResult<Vec<OperationSummary>> {
        let summaries = match filter.date_bounds()? {
            None => {
                sqlx::query_as(concat!(
                    "SELECT ",
                    summary_columns!(),
                    " FROM operations ORDER BY id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            Some((first, last)) => {
                sqlx::query_as(concat!(
                    "SELECT ",
                    summary_columns!(),
                    " FROM operations WHERE last_mile_date BETWEEN ?1 AND ?2 ORDER BY id"
                ))
                .bind(first)
                .bind(last)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(summaries)
    }

    /// Number of stored records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM operations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
