//! # Rate Repository
//!
//! Live rate configuration and the append-only rate change log.
//!
//! ## Read Path
//! ```text
//! current_rates()
//!   ├── rate_config row readable and finite  → stored rates
//!   ├── row missing / malformed              → Rates::DEFAULT (warn)
//!   └── store unreachable                    → Rates::DEFAULT (warn)
//! ```
//!
//! ## Write Path
//! ```text
//! update_rates(new)                       one transaction
//!   1. INSERT rate_changes (previous = values in rate_config, new)
//!   2. UPSERT rate_config (id = 1)
//!   3. read back the log row
//! ```
//! The log row captures the previous values inside the same statement that
//! takes the write lock, so no other update can interleave between the read
//! and the write.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbResult;
use logi_core::{RateChange, Rates};

/// Repository for the rate configuration.
#[derive(Debug, Clone)]
pub struct RateRepository {
    pool: SqlitePool,
}

impl RateRepository {
    /// Creates a new RateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RateRepository { pool }
    }

    /// Returns the live rates, or the defaults (0.84 / 0.35) when they
    /// can't be read. Never fails.
    pub async fn current_rates(&self) -> Rates {
        match self.try_current_rates().await {
            Ok(Some(rates)) if rates.cc_rate.is_finite() && rates.adimex_rate.is_finite() => rates,
            Ok(Some(rates)) => {
                warn!(?rates, "Stored rates are malformed, using defaults");
                Rates::DEFAULT
            }
            Ok(None) => {
                warn!("No rate configuration stored, using defaults");
                Rates::DEFAULT
            }
            Err(e) => {
                warn!(error = %e, "Rate configuration unavailable, using defaults");
                Rates::DEFAULT
            }
        }
    }

    /// Reads the stored rate configuration without any fallback.
    pub async fn try_current_rates(&self) -> DbResult<Option<Rates>> {
        let row: Option<(f64, f64)> =
            sqlx::query_as("SELECT cc_rate, adimex_rate FROM rate_config WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(cc_rate, adimex_rate)| Rates::new(cc_rate, adimex_rate)))
    }

    /// Replaces the live rates and appends one change-log row.
    ///
    /// When no configuration row exists yet, the defaults are logged as the
    /// previous values. Callers validate `new` and check authorization first.
    pub async fn update_rates(&self, new: Rates) -> DbResult<RateChange> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let log_id = sqlx::query(
            r#"
            INSERT INTO rate_changes (
                previous_cc_rate, new_cc_rate,
                previous_adimex_rate, new_adimex_rate,
                changed_at
            ) VALUES (
                COALESCE((SELECT cc_rate FROM rate_config WHERE id = 1), ?1), ?2,
                COALESCE((SELECT adimex_rate FROM rate_config WHERE id = 1), ?3), ?4,
                ?5
            )
            "#,
        )
        .bind(Rates::DEFAULT.cc_rate)
        .bind(new.cc_rate)
        .bind(Rates::DEFAULT.adimex_rate)
        .bind(new.adimex_rate)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query(
            r#"
            INSERT INTO rate_config (id, cc_rate, adimex_rate, updated_at)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                cc_rate = excluded.cc_rate,
                adimex_rate = excluded.adimex_rate,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(new.cc_rate)
        .bind(new.adimex_rate)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let change: RateChange = sqlx::query_as(
            r#"
            SELECT id, previous_cc_rate, new_cc_rate,
                   previous_adimex_rate, new_adimex_rate, changed_at
            FROM rate_changes
            WHERE id = ?1
            "#,
        )
        .bind(log_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            previous_cc = change.previous_cc_rate,
            new_cc = change.new_cc_rate,
            previous_adimex = change.previous_adimex_rate,
            new_adimex = change.new_adimex_rate,
            "Rates updated"
        );
        Ok(change)
    }

    /// Rate change log, newest first.
    pub async fn history(&self) -> DbResult<Vec<RateChange>> {
        let changes = sqlx::query_as(
            r#"
            SELECT id, previous_cc_rate, new_cc_rate,
                   previous_adimex_rate, new_adimex_rate, changed_at
            FROM rate_changes
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(changes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_seeded_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(db.rates().current_rates().await, Rates::DEFAULT);
        assert_eq!(
            db.rates().try_current_rates().await.unwrap(),
            Some(Rates::DEFAULT)
        );
        assert!(db.rates().history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_appends_exactly_one_log_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rates();

        let before = repo.current_rates().await;
        let change = repo.update_rates(Rates::new(1.00, 0.40)).await.unwrap();

        assert_eq!(change.previous(), before);
        assert_eq!(change.current(), Rates::new(1.00, 0.40));
        assert_eq!(repo.current_rates().await, Rates::new(1.00, 0.40));

        let history = repo.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], change);
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.rates();

        repo.update_rates(Rates::new(1.00, 0.40)).await.unwrap();
        repo.update_rates(Rates::new(0.90, 0.30)).await.unwrap();

        let history = repo.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].current(), Rates::new(0.90, 0.30));
        assert_eq!(history[0].previous(), Rates::new(1.00, 0.40));
        assert_eq!(history[1].previous(), Rates::DEFAULT);
    }

    #[tokio::test]
    async fn test_missing_config_row_falls_back_and_recovers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DELETE FROM rate_config")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(db.rates().current_rates().await, Rates::DEFAULT);

        let change = db
            .rates()
            .update_rates(Rates::new(0.5, 0.25))
            .await
            .unwrap();
        assert_eq!(change.previous(), Rates::DEFAULT);
        assert_eq!(db.rates().current_rates().await, Rates::new(0.5, 0.25));
    }

    #[tokio::test]
    async fn test_undecodable_config_row_falls_back_to_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("UPDATE rate_config SET cc_rate = 'abc' WHERE id = 1")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(db.rates().current_rates().await, Rates::DEFAULT);
        let err = db.rates().try_current_rates().await.unwrap_err();
        assert!(matches!(err, DbError::MalformedRow(_)));
    }

    #[tokio::test]
    async fn test_non_finite_config_row_falls_back_to_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("UPDATE rate_config SET cc_rate = 9e999 WHERE id = 1")
            .execute(db.pool())
            .await
            .unwrap();

        let raw = db.rates().try_current_rates().await.unwrap().unwrap();
        assert!(raw.cc_rate.is_infinite());
        assert_eq!(db.rates().current_rates().await, Rates::DEFAULT);
    }

    #[tokio::test]
    async fn test_unreachable_store_falls_back_to_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.rates().update_rates(Rates::new(1.0, 0.4)).await.unwrap();
        db.close().await;

        assert_eq!(db.rates().current_rates().await, Rates::DEFAULT);
        assert!(db.rates().try_current_rates().await.is_err());
    }

    #[tokio::test]
    async fn test_log_rows_cannot_be_rewritten() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.rates().update_rates(Rates::new(1.0, 0.4)).await.unwrap();

        let err = sqlx::query("DELETE FROM rate_changes")
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));

        let err = sqlx::query("UPDATE rate_changes SET new_cc_rate = 9")
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
    }
}
