//! # Settings Repository
//!
//! Single-row settlement settings with explicit load/save.
//!
//! The commission settings are display-only inputs: they drive the
//! commission figures rendered alongside an invoice but never flow
//! into any persisted total, so saving new settings rewrites nothing
//! except this one row.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use hammer_core::{GstRate, Settings};

/// Repository for the settlement settings row.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    global_commission_bps: u32,
    commission_cutoff_date: NaiveDate,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Loads the settings row (seeded by the initial migration).
    pub async fn load(&self) -> DbResult<Settings> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT global_commission_bps, commission_cutoff_date FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        // A missing row only happens on a pre-migration database; fall
        // back to the defaults rather than failing reads.
        Ok(match row {
            Some(row) => Settings {
                global_commission_rate: GstRate::from_bps(row.global_commission_bps),
                commission_cutoff_date: row.commission_cutoff_date,
            },
            None => Settings::default(),
        })
    }

    /// Saves the settings row.
    pub async fn save(&self, settings: &Settings) -> DbResult<()> {
        debug!(
            global_commission_bps = settings.global_commission_rate.bps(),
            cutoff = %settings.commission_cutoff_date,
            "Saving settlement settings"
        );

        sqlx::query(
            r#"
            INSERT INTO settings (id, global_commission_bps, commission_cutoff_date)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                global_commission_bps = excluded.global_commission_bps,
                commission_cutoff_date = excluded.commission_cutoff_date
            "#,
        )
        .bind(settings.global_commission_rate.bps())
        .bind(settings.commission_cutoff_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_seeded_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let settings = db.settings().load().await.unwrap();
        assert_eq!(settings.global_commission_rate, GstRate::from_bps(1200));
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let updated = Settings {
            global_commission_rate: GstRate::from_bps(1500),
            commission_cutoff_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        };
        db.settings().save(&updated).await.unwrap();

        let reloaded = db.settings().load().await.unwrap();
        assert_eq!(reloaded, updated);
    }
}
