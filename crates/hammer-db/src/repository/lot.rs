//! # Lot Repository
//!
//! Database operations for auctioned lots.
//!
//! ## Ownership Index
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lots.invoice_id is the single source of truth for ownership            │
//! │                                                                         │
//! │  NULL        → unsold pool (or won but not yet invoiced)                │
//! │  <invoice>   → owned; only the invoice operations (create, split,       │
//! │                transfer, unsold assignment, delete) may move it         │
//! │                                                                         │
//! │  Every move is a guarded UPDATE: the WHERE clause restates the          │
//! │  expected current owner, and rows_affected() == 0 means another         │
//! │  transaction won the race.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use hammer_core::{GstRate, Lot, Money};

/// Database row shape for a lot; money columns are raw paise.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LotRow {
    pub id: String,
    pub auction_id: String,
    pub lot_number: i64,
    pub description: String,
    pub hammer_price_paise: Option<i64>,
    pub starting_price_paise: Option<i64>,
    pub reserve_price_paise: Option<i64>,
    pub current_bid_paise: Option<i64>,
    pub category: Option<String>,
    pub gst_rate_bps: u32,
    pub invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LotRow> for Lot {
    fn from(row: LotRow) -> Self {
        Lot {
            id: row.id,
            auction_id: row.auction_id,
            lot_number: row.lot_number,
            description: row.description,
            hammer_price: row.hammer_price_paise.map(Money::from_paise),
            starting_price: row.starting_price_paise.map(Money::from_paise),
            reserve_price: row.reserve_price_paise.map(Money::from_paise),
            current_bid: row.current_bid_paise.map(Money::from_paise),
            category: row.category,
            gst_rate: GstRate::from_bps(row.gst_rate_bps),
            invoice_id: row.invoice_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) const LOT_COLUMNS: &str = "id, auction_id, lot_number, description, \
     hammer_price_paise, starting_price_paise, reserve_price_paise, current_bid_paise, \
     category, gst_rate_bps, invoice_id, created_at, updated_at";

/// Arguments for cataloguing a lot.
#[derive(Debug, Clone, Default)]
pub struct NewLot {
    pub auction_id: String,
    pub lot_number: i64,
    pub description: String,
    pub starting_price: Option<Money>,
    pub reserve_price: Option<Money>,
    pub category: Option<String>,
    pub gst_rate: GstRate,
}

/// Repository for lot database operations.
#[derive(Debug, Clone)]
pub struct LotRepository {
    pool: SqlitePool,
}

impl LotRepository {
    /// Creates a new LotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LotRepository { pool }
    }

    /// Catalogues a lot for an auction.
    ///
    /// Lot numbers are unique per auction; a duplicate surfaces as
    /// [`DbError::Conflict`].
    pub async fn create(&self, new: NewLot) -> DbResult<Lot> {
        let now = Utc::now();
        let lot = Lot {
            id: Uuid::new_v4().to_string(),
            auction_id: new.auction_id,
            lot_number: new.lot_number,
            description: new.description,
            hammer_price: None,
            starting_price: new.starting_price,
            reserve_price: new.reserve_price,
            current_bid: None,
            category: new.category,
            gst_rate: new.gst_rate,
            invoice_id: None,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %lot.id, lot_number = lot.lot_number, "Cataloguing lot");

        sqlx::query(
            r#"
            INSERT INTO lots (
                id, auction_id, lot_number, description,
                hammer_price_paise, starting_price_paise, reserve_price_paise,
                current_bid_paise, category, gst_rate_bps, invoice_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&lot.id)
        .bind(&lot.auction_id)
        .bind(lot.lot_number)
        .bind(&lot.description)
        .bind(lot.hammer_price.map(|m| m.paise()))
        .bind(lot.starting_price.map(|m| m.paise()))
        .bind(lot.reserve_price.map(|m| m.paise()))
        .bind(lot.current_bid.map(|m| m.paise()))
        .bind(&lot.category)
        .bind(lot.gst_rate.bps())
        .bind(&lot.invoice_id)
        .bind(lot.created_at)
        .bind(lot.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(lot)
    }

    /// Gets a lot by number within an auction.
    pub async fn get_by_number(&self, auction_id: &str, lot_number: i64) -> DbResult<Lot> {
        let row = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM lots WHERE auction_id = ?1 AND lot_number = ?2"
        ))
        .bind(auction_id)
        .bind(lot_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Lot", lot_number.to_string()))?;

        Ok(row.into())
    }

    /// Records a winning bid on a floor lot.
    ///
    /// Guarded: an owned lot's hammer price is frozen (the owning invoice's
    /// figures depend on it), so this only touches unowned lots.
    pub async fn set_hammer_price(
        &self,
        auction_id: &str,
        lot_number: i64,
        price: Money,
    ) -> DbResult<()> {
        if !price.is_positive() {
            return Err(hammer_core::ValidationError::MustBePositive {
                field: "hammerPrice".to_string(),
            }
            .into());
        }

        let result = sqlx::query(
            r#"
            UPDATE lots SET
                hammer_price_paise = ?3,
                current_bid_paise = ?3,
                updated_at = ?4
            WHERE auction_id = ?1 AND lot_number = ?2 AND invoice_id IS NULL
            "#,
        )
        .bind(auction_id)
        .bind(lot_number)
        .bind(price.paise())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the lot doesn't exist or it is already invoiced.
            let owned: Option<Option<String>> = sqlx::query_scalar(
                "SELECT invoice_id FROM lots WHERE auction_id = ?1 AND lot_number = ?2",
            )
            .bind(auction_id)
            .bind(lot_number)
            .fetch_optional(&self.pool)
            .await?;

            return match owned {
                Some(Some(invoice_id)) => Err(DbError::conflict(format!(
                    "Lot {lot_number} is already on invoice {invoice_id}"
                ))),
                _ => Err(DbError::not_found("Lot", lot_number.to_string())),
            };
        }

        Ok(())
    }

    /// Lists all lots of an auction in catalogue order.
    pub async fn list_for_auction(&self, auction_id: &str) -> DbResult<Vec<Lot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM lots WHERE auction_id = ?1 ORDER BY lot_number"
        ))
        .bind(auction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Lot::from).collect())
    }

    /// Lists unsold lots of an auction: no owner and no positive hammer price.
    ///
    /// This is the picker feed for the unsold-assignment operation.
    pub async fn unsold(&self, auction_id: &str) -> DbResult<Vec<Lot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM lots \
             WHERE auction_id = ?1 AND invoice_id IS NULL \
               AND COALESCE(hammer_price_paise, 0) <= 0 \
             ORDER BY lot_number"
        ))
        .bind(auction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Lot::from).collect())
    }

    /// Lists the lots owned by an invoice, in lot-number order.
    pub async fn for_invoice(&self, invoice_id: &str) -> DbResult<Vec<Lot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM lots WHERE invoice_id = ?1 ORDER BY lot_number"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Lot::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn auction_db() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let auction = db.auctions().create("Test Auction", None).await.unwrap();
        (db, auction.id)
    }

    fn catalogue(auction_id: &str, lot_number: i64) -> NewLot {
        NewLot {
            auction_id: auction_id.to_string(),
            lot_number,
            description: format!("Lot {lot_number}"),
            gst_rate: GstRate::from_bps(500),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_catalogue_and_hammer() {
        let (db, auction_id) = auction_db().await;
        db.lots().create(catalogue(&auction_id, 1)).await.unwrap();

        db.lots()
            .set_hammer_price(&auction_id, 1, Money::from_rupees(1000))
            .await
            .unwrap();

        let lot = db.lots().get_by_number(&auction_id, 1).await.unwrap();
        assert_eq!(lot.hammer_price, Some(Money::from_rupees(1000)));
        assert!(lot.invoice_id.is_none());
    }

    #[tokio::test]
    async fn test_hammer_price_must_be_positive() {
        let (db, auction_id) = auction_db().await;
        db.lots().create(catalogue(&auction_id, 1)).await.unwrap();

        let err = db
            .lots()
            .set_hammer_price(&auction_id, 1, Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unsold_excludes_hammered_lots() {
        let (db, auction_id) = auction_db().await;
        db.lots().create(catalogue(&auction_id, 1)).await.unwrap();
        db.lots().create(catalogue(&auction_id, 2)).await.unwrap();

        db.lots()
            .set_hammer_price(&auction_id, 1, Money::from_rupees(500))
            .await
            .unwrap();

        let unsold = db.lots().unsold(&auction_id).await.unwrap();
        let numbers: Vec<i64> = unsold.iter().map(|l| l.lot_number).collect();
        assert_eq!(numbers, vec![2]);
    }

    #[tokio::test]
    async fn test_duplicate_lot_number_is_conflict() {
        let (db, auction_id) = auction_db().await;
        db.lots().create(catalogue(&auction_id, 5)).await.unwrap();

        let err = db.lots().create(catalogue(&auction_id, 5)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }
}
