//! # Error Types
//!
//! Domain-specific error types for hammer-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hammer-core errors (this file)                                        │
//! │  └── ValidationError  - Operator-request validation failures           │
//! │                                                                         │
//! │  hammer-db errors (separate crate)                                     │
//! │  └── DbError          - NotFound / Conflict / storage failures         │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → API caller                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core crate is pure: everything that can go wrong here is a bad
//! request. Missing entities and ownership races only exist at the
//! store and surface as `DbError::NotFound` / `DbError::Conflict`.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (lot number, invoice id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every mutating operation fails whole: an error means no partial write

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when an operator request doesn't meet requirements.
/// Used for early validation before any write is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// An operation was given an empty lot selection.
    #[error("Lot selection must not be empty")]
    EmptyLotSelection,

    /// A split selected every lot; the source invoice would be empty.
    #[error("Split must leave at least one lot on the source invoice")]
    SplitSelectsAllLots,

    /// A selected lot is not on the source invoice.
    #[error("Lot {lot_number} is not on invoice {invoice_id}")]
    LotNotOnInvoice { invoice_id: String, lot_number: i64 },

    /// Transfer source and target buyer are the same.
    #[error("Cannot transfer lots from a buyer to themselves")]
    SelfTransfer,

    /// The operation would leave the invoice without any lots.
    #[error("Invoice {invoice_id} must retain at least one lot")]
    WouldEmptyInvoice { invoice_id: String },

    /// An unsold lot was selected without a positive hammer price.
    #[error("Lot {lot_number} requires a hammer price greater than zero")]
    MissingHammerPrice { lot_number: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::EmptyLotSelection;
        assert_eq!(err.to_string(), "Lot selection must not be empty");

        let err = ValidationError::MissingHammerPrice { lot_number: 7 };
        assert_eq!(
            err.to_string(),
            "Lot 7 requires a hammer price greater than zero"
        );

        let err = ValidationError::LotNotOnInvoice {
            invoice_id: "inv-1".to_string(),
            lot_number: 42,
        };
        assert_eq!(err.to_string(), "Lot 42 is not on invoice inv-1");
    }
}
