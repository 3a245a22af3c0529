//! # Auction Repository
//!
//! Database operations for auction events. An auction is the container
//! every buyer, lot and invoice hangs off; the settlement operations
//! themselves live in [`crate::repository::invoice`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// An auction event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: String,
    pub name: String,
    /// Calendar date the hammer fell.
    pub held_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Repository for auction database operations.
#[derive(Debug, Clone)]
pub struct AuctionRepository {
    pool: SqlitePool,
}

impl AuctionRepository {
    /// Creates a new AuctionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuctionRepository { pool }
    }

    /// Creates an auction event.
    pub async fn create(&self, name: &str, held_on: Option<NaiveDate>) -> DbResult<Auction> {
        let auction = Auction {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            held_on,
            created_at: Utc::now(),
        };

        debug!(id = %auction.id, name = %auction.name, "Creating auction");

        sqlx::query("INSERT INTO auctions (id, name, held_on, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&auction.id)
            .bind(&auction.name)
            .bind(auction.held_on)
            .bind(auction.created_at)
            .execute(&self.pool)
            .await?;

        Ok(auction)
    }

    /// Gets an auction by ID.
    pub async fn get(&self, id: &str) -> DbResult<Auction> {
        sqlx::query_as::<_, Auction>(
            "SELECT id, name, held_on, created_at FROM auctions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Auction", id))
    }

    /// Lists all auctions, newest first.
    pub async fn list(&self) -> DbResult<Vec<Auction>> {
        let auctions = sqlx::query_as::<_, Auction>(
            "SELECT id, name, held_on, created_at FROM auctions ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(auctions)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_get_auction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let created = db
            .auctions()
            .create("Numismatic Auction 42", None)
            .await
            .unwrap();
        let fetched = db.auctions().get(&created.id).await.unwrap();

        assert_eq!(fetched.name, "Numismatic Auction 42");
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn test_get_missing_auction_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.auctions().get("no-such-id").await.unwrap_err();
        assert!(matches!(err, crate::error::DbError::NotFound { .. }));
    }
}
