//! # Validation Module
//!
//! Input validation for operation records, rates, receipts and filters.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Shell (CLI argument parsing)                                 │
//! │  └── Type validation (numbers parse, dates parse)                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Commands                                                      │
//! │  └── THIS MODULE: non-negative amounts, required keys, PDF receipts    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculator                                                    │
//! │  └── Trusts its input, never fails                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                             │
//! │  └── NOT NULL / CHECK constraints                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use logi_core::validation::{validate_attachment, validate_rates};
//! use logi_core::{Attachment, Rates};
//!
//! validate_rates(&Rates::new(1.0, 0.4)).unwrap();
//! validate_attachment(&Attachment::new("receipt.pdf", vec![0x25])).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Attachment, OperationInput, OperationPatch, Rates, RecordFilter};
use crate::{MAX_ATTACHMENT_BYTES, MAX_TEXT_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

fn validate_required_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    validate_text(field, value)
}

fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}

fn validate_count(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::negative(field));
    }
    Ok(())
}

fn validate_quantity(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::negative(field));
    }
    Ok(())
}

fn validate_amount(field: &str, value: Money) -> ValidationResult<()> {
    validate_quantity(field, value.amount())
}

fn check<T>(
    value: &Option<T>,
    validator: impl FnOnce(&T) -> ValidationResult<()>,
) -> ValidationResult<()> {
    match value {
        Some(v) => validator(v),
        None => Ok(()),
    }
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates the raw fields of a new record.
///
/// ## Rules
/// - Month label and first-mile master are required
/// - Free-text fields are at most 100 characters
/// - Counts, weight and every currency amount are finite and not negative
pub fn validate_operation_input(input: &OperationInput) -> ValidationResult<()> {
    validate_required_text("month", &input.month)?;
    validate_required_text("first-mile master", &input.first_mile_master)?;
    validate_text("last-mile master", &input.last_mile_master)?;
    validate_text("freight type", &input.freight_type)?;
    validate_text("truck type", &input.truck_type)?;

    validate_count("boxes", input.boxes)?;
    validate_count("packages", input.packages)?;
    validate_count("crew size", input.crew_size)?;
    validate_quantity("weight", input.weight_kg)?;

    validate_amount("crew cost", input.crew_cost)?;
    validate_amount("forklift cost", input.forklift_cost)?;
    validate_amount("yale cost", input.yale_cost)?;
    validate_amount("extraordinary service cost", input.extraordinary_cost)?;
    validate_amount("subcontracted freight cost", input.subcontract_freight_cost)?;
    validate_amount("ADIMEX paid", input.adimex_paid)?;

    Ok(())
}

/// Validates the fields a patch supplies, with the same rules as
/// [`validate_operation_input`].
pub fn validate_patch(patch: &OperationPatch) -> ValidationResult<()> {
    check(&patch.month, |v| validate_required_text("month", v))?;
    check(&patch.first_mile_master, |v| {
        validate_required_text("first-mile master", v)
    })?;
    check(&patch.last_mile_master, |v| validate_text("last-mile master", v))?;
    check(&patch.freight_type, |v| validate_text("freight type", v))?;
    check(&patch.truck_type, |v| validate_text("truck type", v))?;

    check(&patch.boxes, |v| validate_count("boxes", *v))?;
    check(&patch.packages, |v| validate_count("packages", *v))?;
    check(&patch.crew_size, |v| validate_count("crew size", *v))?;
    check(&patch.weight_kg, |v| validate_quantity("weight", *v))?;

    check(&patch.crew_cost, |v| validate_amount("crew cost", *v))?;
    check(&patch.forklift_cost, |v| validate_amount("forklift cost", *v))?;
    check(&patch.yale_cost, |v| validate_amount("yale cost", *v))?;
    check(&patch.extraordinary_cost, |v| {
        validate_amount("extraordinary service cost", *v)
    })?;
    check(&patch.subcontract_freight_cost, |v| {
        validate_amount("subcontracted freight cost", *v)
    })?;
    check(&patch.adimex_paid, |v| validate_amount("ADIMEX paid", *v))?;

    check(&patch.attachment, validate_attachment)?;

    Ok(())
}

// =============================================================================
// Rates, Receipts, Filters
// =============================================================================

/// Validates a rate pair before it becomes the live configuration.
///
/// ## Example
/// ```rust
/// use logi_core::validation::validate_rates;
/// use logi_core::Rates;
///
/// assert!(validate_rates(&Rates::new(0.84, 0.35)).is_ok());
/// assert!(validate_rates(&Rates::new(0.0, 0.0)).is_ok());
/// assert!(validate_rates(&Rates::new(-1.0, 0.35)).is_err());
/// ```
pub fn validate_rates(rates: &Rates) -> ValidationResult<()> {
    validate_quantity("CC rate", rates.cc_rate)?;
    validate_quantity("ADIMEX rate", rates.adimex_rate)?;
    Ok(())
}

/// Validates a receipt upload.
///
/// ## Rules
/// - Filename is required and must end in `.pdf` (any case)
/// - Payload is non-empty and at most 16 MiB
pub fn validate_attachment(attachment: &Attachment) -> ValidationResult<()> {
    let filename = attachment.filename.trim();

    if filename.is_empty() {
        return Err(ValidationError::required("receipt filename"));
    }

    if !filename.to_ascii_lowercase().ends_with(".pdf") {
        return Err(ValidationError::InvalidFormat {
            field: "receipt".to_string(),
            reason: "only PDF files are accepted".to_string(),
        });
    }

    if attachment.is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "receipt".to_string(),
            reason: "file is empty".to_string(),
        });
    }

    if attachment.len() > MAX_ATTACHMENT_BYTES {
        return Err(ValidationError::InvalidFormat {
            field: "receipt".to_string(),
            reason: format!("file exceeds {} bytes", MAX_ATTACHMENT_BYTES),
        });
    }

    Ok(())
}

/// Validates a record filter (month 1..=12, non-inverted range).
pub fn validate_filter(filter: &RecordFilter) -> ValidationResult<()> {
    filter.date_bounds().map(|_| ())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn input() -> OperationInput {
        let day = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        OperationInput {
            month: "Abril".to_string(),
            first_mile_date: day,
            first_mile_master: "FM-778".to_string(),
            last_mile_date: day,
            last_mile_master: String::new(),
            boxes: 0,
            packages: 0,
            weight_kg: 0.0,
            crew_size: 0,
            crew_cost: Money::zero(),
            forklift_cost: Money::zero(),
            yale_cost: Money::zero(),
            extraordinary_cost: Money::zero(),
            freight_type: String::new(),
            truck_type: String::new(),
            subcontract_freight_cost: Money::zero(),
            adimex_paid: Money::zero(),
        }
    }

    #[test]
    fn test_all_zero_input_is_valid() {
        assert!(validate_operation_input(&input()).is_ok());
    }

    #[test]
    fn test_required_fields() {
        let mut raw = input();
        raw.first_mile_master = "   ".to_string();
        assert!(matches!(
            validate_operation_input(&raw),
            Err(ValidationError::Required { .. })
        ));

        let mut raw = input();
        raw.month = String::new();
        assert!(validate_operation_input(&raw).is_err());
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut raw = input();
        raw.packages = -1;
        assert!(matches!(
            validate_operation_input(&raw),
            Err(ValidationError::Negative { .. })
        ));

        let mut raw = input();
        raw.weight_kg = -0.5;
        assert!(validate_operation_input(&raw).is_err());

        let mut raw = input();
        raw.subcontract_freight_cost = Money::new(-10.0);
        assert!(validate_operation_input(&raw).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut raw = input();
        raw.weight_kg = f64::INFINITY;
        assert!(matches!(
            validate_operation_input(&raw),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_text_length() {
        let mut raw = input();
        raw.truck_type = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(matches!(
            validate_operation_input(&raw),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_patch_validation() {
        assert!(validate_patch(&OperationPatch::default()).is_ok());

        let ok = OperationPatch {
            packages: Some(10),
            weight_kg: Some(2.5),
            ..Default::default()
        };
        assert!(validate_patch(&ok).is_ok());

        let bad = OperationPatch {
            boxes: Some(-3),
            ..Default::default()
        };
        assert!(validate_patch(&bad).is_err());

        let blank_master = OperationPatch {
            first_mile_master: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_patch(&blank_master).is_err());

        let bad_pdf = OperationPatch {
            attachment: Some(Attachment::new("receipt.png", vec![1, 2])),
            ..Default::default()
        };
        assert!(validate_patch(&bad_pdf).is_err());
    }

    #[test]
    fn test_attachment_rules() {
        assert!(validate_attachment(&Attachment::new("Receipt.PDF", vec![1])).is_ok());
        assert!(validate_attachment(&Attachment::new("", vec![1])).is_err());
        assert!(validate_attachment(&Attachment::new("receipt.txt", vec![1])).is_err());
        assert!(validate_attachment(&Attachment::new("receipt.pdf", Vec::new())).is_err());
        assert!(validate_attachment(&Attachment::new(
            "huge.pdf",
            vec![0; MAX_ATTACHMENT_BYTES + 1]
        ))
        .is_err());
    }

    #[test]
    fn test_rates_rules() {
        assert!(validate_rates(&Rates::DEFAULT).is_ok());
        assert!(validate_rates(&Rates::new(1.0, -0.1)).is_err());
        assert!(validate_rates(&Rates::new(f64::NAN, 0.35)).is_err());
    }

    #[test]
    fn test_filter_rules() {
        assert!(validate_filter(&RecordFilter::All).is_ok());
        assert!(validate_filter(&RecordFilter::MonthYear { month: 6, year: 2026 }).is_ok());
        assert!(validate_filter(&RecordFilter::MonthYear { month: 13, year: 2026 }).is_err());
    }
}
