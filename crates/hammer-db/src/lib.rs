//! # hammer-db: Database Layer for the Settlement Engine
//!
//! This crate provides database access for the auction settlement engine.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Settlement Data Flow                               │
//! │                                                                         │
//! │  Back-office operation (createInvoice, transferLots, ...)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     hammer-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (invoice.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ InvoiceRepo   │    │ 001_init.sql │  │   │
//! │  │   │ WAL mode      │◄───│ LotRepo       │    │ ...          │  │   │
//! │  │   │ Transactions  │    │ BuyerRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   Settlement math stays in hammer-core; this crate only         │   │
//! │  │   persists its outputs, atomically per operation.               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL, foreign keys on)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (invoice, lot, buyer, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hammer_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/hammer.db")).await?;
//!
//! let invoice = db.invoices().create(new_invoice).await?;
//! let unsold = db.lots().unsold(&auction_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::auction::{Auction, AuctionRepository};
pub use repository::buyer::{BuyerRepository, NewBuyer};
pub use repository::invoice::InvoiceRepository;
pub use repository::lot::{LotRepository, NewLot};
pub use repository::settings::SettingsRepository;
