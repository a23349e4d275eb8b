//! # Rate Commands
//!
//! Show the live rates, list the change log, and replace the rates.
//!
//! ## Admin Gate
//! `rates set` compares the supplied key with `LOGI_ADMIN_KEY`. This is a
//! shared string that deters accidental edits; it is not authentication.
//! With no key configured, rate changes are disabled.

use tracing::warn;

use crate::error::{AppError, AppResult};
use logi_core::validation::validate_rates;
use logi_core::{RateChange, Rates};
use logi_db::Database;

/// Live rates (defaults when the configuration can't be read).
pub async fn show_rates(db: &Database) -> Rates {
    db.rates().current_rates().await
}

/// Rate change log, newest first.
pub async fn rate_history(db: &Database) -> AppResult<Vec<RateChange>> {
    Ok(db.rates().history().await?)
}

/// Replaces the live rates after checking the admin key.
///
/// Records already on file keep their own rate snapshot; only records
/// created afterwards use the new rates.
pub async fn change_rates(
    db: &Database,
    configured_key: Option<&str>,
    supplied_key: &str,
    new: Rates,
) -> AppResult<RateChange> {
    check_admin_key(configured_key, supplied_key)?;
    validate_rates(&new)?;

    Ok(db.rates().update_rates(new).await?)
}

fn check_admin_key(configured: Option<&str>, supplied: &str) -> AppResult<()> {
    match configured {
        None => Err(AppError::forbidden(
            "rate changes are disabled: LOGI_ADMIN_KEY is not set",
        )),
        Some(expected) if expected == supplied => Ok(()),
        Some(_) => {
            warn!("Rate change refused: wrong admin key");
            Err(AppError::forbidden("wrong admin key"))
        }
    }
}
