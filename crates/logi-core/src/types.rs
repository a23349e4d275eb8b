//! # Domain Types
//!
//! Core domain types used throughout Logi.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐                                               │
//! │  │  OperationRecord    │                                               │
//! │  │  ─────────────────  │   ┌────────────────┐   ┌────────────────┐     │
//! │  │  id (surrogate)     │──►│ OperationInput │   │ DerivedFields  │     │
//! │  │  input              │   │ raw form data  │   │ computed only  │     │
//! │  │  derived ───────────┼──►└────────────────┘   └────────────────┘     │
//! │  │  rates (snapshot)   │──►┌────────────────┐   ┌────────────────┐     │
//! │  │  attachment         │──►│ Rates          │   │ Attachment     │     │
//! │  └─────────────────────┘   │ cc / adimex    │   │ receipt PDF    │     │
//! │                            └────────────────┘   └────────────────┘     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ OperationPatch  │   │  RecordFilter   │   │   RateChange    │       │
//! │  │ partial edit    │   │  All / Month /  │   │  append-only    │       │
//! │  │                 │   │  DateRange      │   │  audit row      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A record stores the rates it was created under. Edits recompute the
//! derived fields from that snapshot, so a later rate change never alters
//! the economics of a shipment already on file.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::MONTH_LABELS;

// =============================================================================
// Rates
// =============================================================================

/// Per-unit rates applied by the calculator.
///
/// Used both for the live rate configuration and for the snapshot stored
/// on every record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rates {
    /// CC-service rate, currency per package.
    pub cc_rate: f64,
    /// ADIMEX customs rate, currency per kilogram.
    pub adimex_rate: f64,
}

impl Rates {
    /// Rates used when no configuration row can be read.
    pub const DEFAULT: Rates = Rates {
        cc_rate: 0.84,
        adimex_rate: 0.35,
    };

    pub const fn new(cc_rate: f64, adimex_rate: f64) -> Self {
        Rates {
            cc_rate,
            adimex_rate,
        }
    }
}

impl Default for Rates {
    fn default() -> Self {
        Rates::DEFAULT
    }
}

// =============================================================================
// Operation Input
// =============================================================================

/// Raw, user-entered fields of one shipment event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OperationInput {
    /// Month label the operation is reported under (e.g. "Marzo").
    pub month: String,

    /// First-mile pre-alert date.
    #[ts(as = "String")]
    pub first_mile_date: NaiveDate,

    /// First-mile master reference (consignment key).
    pub first_mile_master: String,

    /// Last-mile pre-alert date. Filters and month/year reports key on it.
    #[ts(as = "String")]
    pub last_mile_date: NaiveDate,

    /// Last-mile master reference.
    pub last_mile_master: String,

    pub boxes: i64,
    pub packages: i64,
    pub weight_kg: f64,

    /// Crew headcount.
    pub crew_size: i64,
    pub crew_cost: Money,
    pub forklift_cost: Money,
    pub yale_cost: Money,
    pub extraordinary_cost: Money,

    /// Freight type. Free text: the category set varies between sites.
    pub freight_type: String,
    pub truck_type: String,
    pub subcontract_freight_cost: Money,

    /// Amount actually invoiced by the ADIMEX customs service.
    pub adimex_paid: Money,
}

// =============================================================================
// Derived Fields
// =============================================================================

/// Monetary fields computed from an [`OperationInput`] and a [`Rates`] pair.
///
/// Never entered directly; see [`crate::calculator::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DerivedFields {
    /// CC-service revenue: `packages × cc_rate`.
    pub cc_services: Money,
    /// Theoretical ADIMEX charge: `weight_kg × adimex_rate`.
    pub adimex_calc: Money,
    /// Sum of the five operating cost fields.
    pub total_costs: Money,
    /// `adimex_calc − adimex_paid`.
    pub adimex_diff: Money,
    /// `cc_services − total_costs`.
    pub service_diff: Money,
}

// =============================================================================
// Attachment
// =============================================================================

/// A receipt PDF stored with a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Attachment {
    /// Original filename of the upload.
    pub filename: String,
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Attachment {
            filename: filename.into(),
            bytes,
        }
    }

    /// Payload size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// How to look up a record's attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKey {
    /// By surrogate id.
    Id(i64),
    /// By first-mile master reference (lowest id wins on duplicates).
    MasterRef(String),
}

// =============================================================================
// Operation Record
// =============================================================================

/// One persisted shipment event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OperationRecord {
    /// Surrogate id assigned by the store.
    pub id: i64,
    pub input: OperationInput,
    pub derived: DerivedFields,
    /// Rates in effect when the record was created.
    pub rates: Rates,
    pub attachment: Option<Attachment>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl OperationRecord {
    /// Returns true when a receipt PDF is on file.
    #[inline]
    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }
}

/// History row: the fields listed in the management table, without the blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OperationSummary {
    pub id: i64,
    pub month: String,
    pub first_mile_master: String,
    pub last_mile_master: String,
    pub total_costs: Money,
    pub attachment_name: Option<String>,
}

// =============================================================================
// Operation Patch
// =============================================================================

/// A partial edit of a record's raw fields.
///
/// `None` leaves the stored value untouched. Derived fields are not part of
/// a patch: the store recomputes all of them after applying it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OperationPatch {
    pub month: Option<String>,
    #[ts(as = "Option<String>")]
    pub first_mile_date: Option<NaiveDate>,
    pub first_mile_master: Option<String>,
    #[ts(as = "Option<String>")]
    pub last_mile_date: Option<NaiveDate>,
    pub last_mile_master: Option<String>,
    pub boxes: Option<i64>,
    pub packages: Option<i64>,
    pub weight_kg: Option<f64>,
    pub crew_size: Option<i64>,
    pub crew_cost: Option<Money>,
    pub forklift_cost: Option<Money>,
    pub yale_cost: Option<Money>,
    pub extraordinary_cost: Option<Money>,
    pub freight_type: Option<String>,
    pub truck_type: Option<String>,
    pub subcontract_freight_cost: Option<Money>,
    pub adimex_paid: Option<Money>,
    /// Replacement receipt. `None` keeps the stored one.
    pub attachment: Option<Attachment>,
}

impl OperationPatch {
    /// Overwrites the supplied fields of `input`.
    pub fn apply_to(&self, input: &mut OperationInput) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut input.month, &self.month);
        set(&mut input.first_mile_date, &self.first_mile_date);
        set(&mut input.first_mile_master, &self.first_mile_master);
        set(&mut input.last_mile_date, &self.last_mile_date);
        set(&mut input.last_mile_master, &self.last_mile_master);
        set(&mut input.boxes, &self.boxes);
        set(&mut input.packages, &self.packages);
        set(&mut input.weight_kg, &self.weight_kg);
        set(&mut input.crew_size, &self.crew_size);
        set(&mut input.crew_cost, &self.crew_cost);
        set(&mut input.forklift_cost, &self.forklift_cost);
        set(&mut input.yale_cost, &self.yale_cost);
        set(&mut input.extraordinary_cost, &self.extraordinary_cost);
        set(&mut input.freight_type, &self.freight_type);
        set(&mut input.truck_type, &self.truck_type);
        set(
            &mut input.subcontract_freight_cost,
            &self.subcontract_freight_cost,
        );
        set(&mut input.adimex_paid, &self.adimex_paid);
    }

    /// True when the patch changes nothing, not even the attachment.
    pub fn is_empty(&self) -> bool {
        *self == OperationPatch::default()
    }
}

// =============================================================================
// Record Filter
// =============================================================================

/// Selection applied to bulk reads, on the last-mile pre-alert date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordFilter {
    /// Every record.
    #[default]
    All,
    /// One calendar month of one year.
    MonthYear { month: u32, year: i32 },
    /// Inclusive on both ends.
    DateRange {
        #[ts(as = "String")]
        from: NaiveDate,
        #[ts(as = "String")]
        to: NaiveDate,
    },
}

impl RecordFilter {
    /// Resolves the filter into inclusive date bounds.
    ///
    /// ## Returns
    /// * `Ok(None)` - no filtering
    /// * `Ok(Some((first, last)))` - inclusive last-mile date bounds
    /// * `Err(_)` - month outside 1..=12 or an inverted range
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use logi_core::RecordFilter;
    ///
    /// let feb = RecordFilter::MonthYear { month: 2, year: 2024 };
    /// let (first, last) = feb.date_bounds().unwrap().unwrap();
    /// assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    /// assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    /// ```
    pub fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, ValidationError> {
        match *self {
            RecordFilter::All => Ok(None),
            RecordFilter::MonthYear { month, year } => {
                let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                    ValidationError::OutOfRange {
                        field: "month".to_string(),
                        min: 1,
                        max: 12,
                    }
                })?;
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                };
                let last = next
                    .and_then(|d| d.pred_opt())
                    .ok_or_else(|| ValidationError::InvalidFormat {
                        field: "year".to_string(),
                        reason: format!("{} is out of the supported calendar range", year),
                    })?;
                Ok(Some((first, last)))
            }
            RecordFilter::DateRange { from, to } => {
                if from > to {
                    return Err(ValidationError::InvertedRange {
                        from: from.to_string(),
                        to: to.to_string(),
                    });
                }
                Ok(Some((from, to)))
            }
        }
    }

    /// Checks whether a last-mile date falls inside the filter.
    pub fn matches(&self, last_mile_date: NaiveDate) -> bool {
        match self.date_bounds() {
            Ok(None) => true,
            Ok(Some((first, last))) => first <= last_mile_date && last_mile_date <= last,
            Err(_) => false,
        }
    }
}

// =============================================================================
// Rate Change Log
// =============================================================================

/// One append-only audit row written by a rate update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RateChange {
    pub id: i64,
    pub previous_cc_rate: f64,
    pub new_cc_rate: f64,
    pub previous_adimex_rate: f64,
    pub new_adimex_rate: f64,
    #[ts(as = "String")]
    pub changed_at: DateTime<Utc>,
}

impl RateChange {
    /// Rates in effect before the change.
    pub fn previous(&self) -> Rates {
        Rates::new(self.previous_cc_rate, self.previous_adimex_rate)
    }

    /// Rates in effect after the change.
    pub fn current(&self) -> Rates {
        Rates::new(self.new_cc_rate, self.new_adimex_rate)
    }
}

// =============================================================================
// Month Labels
// =============================================================================

/// Month label for a date, as offered by the entry form.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use logi_core::month_label;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
/// assert_eq!(month_label(date), "Marzo");
/// ```
pub fn month_label(date: NaiveDate) -> &'static str {
    MONTH_LABELS[date.month0() as usize]
}

// =============================================================================
// Unit Tests
// =============================================================================
