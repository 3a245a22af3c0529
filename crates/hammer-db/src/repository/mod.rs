//! # Repository Layer
//!
//! Repository implementations for database entities.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Pattern                                  │
//! │                                                                         │
//! │  Caller                     Repository                  Database       │
//! │  ──────                     ──────────                  ────────       │
//! │                                                                         │
//! │  create_invoice ──────────► InvoiceRepository ────────► SQL INSERTs    │
//! │  transfer_lots  ──────────► InvoiceRepository ────────► one tx         │
//! │  unsold_lots    ──────────► LotRepository     ────────► SQL SELECT     │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL isolated to this layer                                           │
//! │  • Settlement math stays in hammer-core (pure, unit-testable)           │
//! │  • Each multi-row mutation is a single transaction                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`auction`] - Auction events
//! - [`buyer`] - Registered bidders
//! - [`invoice`] - Settlement invoices and all lot-moving operations
//! - [`lot`] - Auctioned items
//! - [`settings`] - Single-row commission settings

pub mod auction;
pub mod buyer;
pub mod invoice;
pub mod lot;
pub mod settings;
