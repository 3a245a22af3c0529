//! # Buyer Repository
//!
//! Database operations for registered bidders.
//!
//! Buyers are identified two ways: the UUID `id` for relations, and the
//! `(auction_id, paddle_number)` pair as the business key the floor staff
//! actually use. Invoices keep their own frozen snapshot of buyer details,
//! so edits here never rewrite issued paperwork.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use hammer_core::{Buyer, BuyerSummary, GstRate};

/// Arguments for registering a buyer.
#[derive(Debug, Clone, Default)]
pub struct NewBuyer {
    pub auction_id: String,
    pub paddle_number: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
    /// Per-buyer commission override (display-only).
    pub commission_rate: Option<GstRate>,
}

/// Database row shape for a buyer; rate columns are raw basis points.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BuyerRow {
    pub id: String,
    pub auction_id: String,
    pub paddle_number: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub commission_rate_bps: Option<u32>,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<BuyerRow> for Buyer {
    fn from(row: BuyerRow) -> Self {
        Buyer {
            id: row.id,
            auction_id: row.auction_id,
            paddle_number: row.paddle_number,
            name: row.name,
            phone: row.phone,
            email: row.email,
            gstin: row.gstin,
            commission_rate: row.commission_rate_bps.map(GstRate::from_bps),
            created_at: row.created_at,
        }
    }
}

const BUYER_COLUMNS: &str = "id, auction_id, paddle_number, name, phone, email, gstin, \
     commission_rate_bps, created_at";

/// Repository for buyer database operations.
#[derive(Debug, Clone)]
pub struct BuyerRepository {
    pool: SqlitePool,
}

impl BuyerRepository {
    /// Creates a new BuyerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BuyerRepository { pool }
    }

    /// Registers a buyer for an auction.
    ///
    /// Paddle numbers are unique per auction; a duplicate registration
    /// surfaces as [`DbError::Conflict`].
    pub async fn create(&self, new: NewBuyer) -> DbResult<Buyer> {
        let buyer = Buyer {
            id: Uuid::new_v4().to_string(),
            auction_id: new.auction_id,
            paddle_number: new.paddle_number,
            name: new.name,
            phone: new.phone,
            email: new.email,
            gstin: new.gstin,
            commission_rate: new.commission_rate,
            created_at: Utc::now(),
        };

        debug!(
            id = %buyer.id,
            paddle_number = buyer.paddle_number,
            "Registering buyer"
        );

        sqlx::query(
            r#"
            INSERT INTO buyers (
                id, auction_id, paddle_number, name,
                phone, email, gstin, commission_rate_bps, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&buyer.id)
        .bind(&buyer.auction_id)
        .bind(buyer.paddle_number)
        .bind(&buyer.name)
        .bind(&buyer.phone)
        .bind(&buyer.email)
        .bind(&buyer.gstin)
        .bind(buyer.commission_rate.map(|r| r.bps()))
        .bind(buyer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(buyer)
    }

    /// Gets a buyer by ID.
    pub async fn get(&self, id: &str) -> DbResult<Buyer> {
        let row = sqlx::query_as::<_, BuyerRow>(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Buyer", id))?;

        Ok(row.into())
    }

    /// Gets a buyer by paddle number within an auction.
    pub async fn get_by_paddle(&self, auction_id: &str, paddle_number: i64) -> DbResult<Buyer> {
        let row = sqlx::query_as::<_, BuyerRow>(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers WHERE auction_id = ?1 AND paddle_number = ?2"
        ))
        .bind(auction_id)
        .bind(paddle_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Buyer (paddle)", paddle_number.to_string()))?;

        Ok(row.into())
    }

    /// Lists buyers for an auction as picker rows, in paddle order.
    ///
    /// Used by the transfer-target and unsold-assignment pickers.
    pub async fn list_for_auction(&self, auction_id: &str) -> DbResult<Vec<BuyerSummary>> {
        let rows = sqlx::query_as::<_, BuyerRow>(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers WHERE auction_id = ?1 ORDER BY paddle_number"
        ))
        .bind(auction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(summary).collect())
    }

    /// Lists every registered buyer across all auctions.
    pub async fn list_all(&self) -> DbResult<Vec<BuyerSummary>> {
        let rows = sqlx::query_as::<_, BuyerRow>(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers ORDER BY auction_id, paddle_number"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(summary).collect())
    }
}

fn summary(row: BuyerRow) -> BuyerSummary {
    BuyerSummary {
        id: row.id,
        auction_id: row.auction_id,
        paddle_number: row.paddle_number,
        name: row.name,
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

    #[tokio::test]
    async fn test_register_and_fetch_buyer() {
        let (db, auction_id) = auction_db().await;

        let created = db
            .buyers()
            .create(NewBuyer {
                auction_id: auction_id.clone(),
                paddle_number: 101,
                name: "R. Sharma".to_string(),
                gstin: Some("27ABCDE1234F1Z5".to_string()),
                commission_rate: Some(GstRate::from_bps(1000)),
                ..Default::default()
            })
            .await
            .unwrap();

        let fetched = db.buyers().get(&created.id).await.unwrap();
        assert_eq!(fetched.paddle_number, 101);
        assert_eq!(fetched.commission_rate, Some(GstRate::from_bps(1000)));

        let by_paddle = db.buyers().get_by_paddle(&auction_id, 101).await.unwrap();
        assert_eq!(by_paddle.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_paddle_is_conflict() {
        let (db, auction_id) = auction_db().await;

        let register = |name: &str| NewBuyer {
            auction_id: auction_id.clone(),
            paddle_number: 7,
            name: name.to_string(),
            ..Default::default()
        };

        db.buyers().create(register("First")).await.unwrap();
        let err = db.buyers().create(register("Second")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_list_is_in_paddle_order() {
        let (db, auction_id) = auction_db().await;

        for paddle in [30, 10, 20] {
            db.buyers()
                .create(NewBuyer {
                    auction_id: auction_id.clone(),
                    paddle_number: paddle,
                    name: format!("Buyer {paddle}"),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let listed = db.buyers().list_for_auction(&auction_id).await.unwrap();
        let paddles: Vec<i64> = listed.iter().map(|b| b.paddle_number).collect();
        assert_eq!(paddles, vec![10, 20, 30]);
    }
}
