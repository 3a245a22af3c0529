//! # hammer-core: Pure Settlement Logic
//!
//! This crate is the **heart** of the settlement engine. It contains all
//! invoice mathematics as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Settlement Engine Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Back-office operations (external callers)          │   │
//! │  │   createInvoice, splitInvoice, transferLots, assignUnsoldLots  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hammer-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │ aggregate │  │ numbering │  │commission │  │   │
//! │  │   │ reverse   │  │ per-rate  │  │ renumber  │  │ display-  │  │   │
//! │  │   │ GST, ₹    │  │ summary   │  │ plans     │  │ only block│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    hammer-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, transactional operations     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Lot, Invoice, Buyer, Settings, ...)
//! - [`money`] - Money in integer paise, reverse GST, rupee rounding
//! - [`aggregate`] - Invoice aggregator: lots + charges → lines + amounts
//! - [`commission`] - Display-only buyer's premium figures
//! - [`numbering`] - Invoice number formatting and renumbering plans
//! - [`words`] - Amount-in-words (Indian numbering)
//! - [`validation`] - Operator-request validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float drift
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use hammer_core::money::{GstRate, Money};
//!
//! // Hammer prices are GST-inclusive; peel the tax out
//! let hammer = Money::from_rupees(1000);
//! let breakup = hammer.reverse_gst(GstRate::from_bps(500)); // 5%
//!
//! assert_eq!(breakup.base.paise(), 95_238);
//! assert_eq!(breakup.base + breakup.gst, hammer);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod commission;
pub mod error;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;
pub mod words;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use hammer_core::Money` instead of
// `use hammer_core::money::Money`

pub use error::ValidationError;
pub use money::{GstRate, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default per-buyer commission when no override was negotiated: 12%.
///
/// Applies only to invoices dated before the commission cutoff; newer
/// invoices always use the global rate from [`types::Settings`].
pub const DEFAULT_BUYER_COMMISSION_BPS: u32 = 1200;

/// CGST on the commission amount: 9%. Display-only (see [`commission`]).
pub const COMMISSION_CGST_BPS: u32 = 900;

/// SGST on the commission amount: 9%. Display-only (see [`commission`]).
pub const COMMISSION_SGST_BPS: u32 = 900;

/// Upper bound for any GST rate: 100%.
pub const MAX_GST_RATE_BPS: u32 = 10_000;
