//! # Validation Module
//!
//! Early validation for operator requests: the checks run before any
//! write is attempted, so a rejected request provably changed nothing.
//!
//! ## Usage
//! ```rust
//! use hammer_core::validation::validate_split_selection;
//!
//! // Splitting lots 10 and 11 off an invoice that owns 10, 11, 12
//! assert!(validate_split_selection("inv-1", &[10, 11, 12], &[10, 11]).is_ok());
//! // Selecting every lot would empty the source
//! assert!(validate_split_selection("inv-1", &[10, 11], &[10, 11]).is_err());
//! ```

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::money::{GstRate, Money};
use crate::types::{Charge, InsuranceCharge};
use crate::MAX_GST_RATE_BPS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Lot Selection Validators
// =============================================================================

/// Validates a split selection against the source invoice's lots.
///
/// ## Rules
/// - Selection must not be empty
/// - Every selected lot must be on the source invoice
/// - At least one lot must remain on the source (`|S| < total`)
pub fn validate_split_selection(
    invoice_id: &str,
    owned: &[i64],
    selection: &[i64],
) -> ValidationResult<()> {
    validate_subset_selection(invoice_id, owned, selection)?;

    if selection.len() >= owned.len() {
        return Err(ValidationError::SplitSelectsAllLots);
    }

    Ok(())
}

/// Validates a transfer selection against the source invoice's lots.
///
/// ## Rules
/// - Selection must not be empty
/// - Every selected lot must be on the source invoice
/// - Selecting ALL lots is allowed: the emptied source gets deleted
pub fn validate_transfer_selection(
    invoice_id: &str,
    owned: &[i64],
    selection: &[i64],
) -> ValidationResult<()> {
    validate_subset_selection(invoice_id, owned, selection)
}

fn validate_subset_selection(
    invoice_id: &str,
    owned: &[i64],
    selection: &[i64],
) -> ValidationResult<()> {
    if selection.is_empty() {
        return Err(ValidationError::EmptyLotSelection);
    }

    for lot_number in selection {
        if !owned.contains(lot_number) {
            return Err(ValidationError::LotNotOnInvoice {
                invoice_id: invoice_id.to_string(),
                lot_number: *lot_number,
            });
        }
    }

    Ok(())
}

/// Rejects a transfer where source and target buyer are the same.
pub fn validate_distinct_buyers(from_buyer: &str, to_buyer: &str) -> ValidationResult<()> {
    if from_buyer == to_buyer {
        return Err(ValidationError::SelfTransfer);
    }
    Ok(())
}

/// Validates the operator-supplied price map for an unsold assignment.
///
/// ## Rules
/// - At least one lot selected
/// - Every selected lot carries a price greater than zero
pub fn validate_assignment_prices(prices: &BTreeMap<i64, Money>) -> ValidationResult<()> {
    if prices.is_empty() {
        return Err(ValidationError::EmptyLotSelection);
    }

    for (lot_number, price) in prices {
        if !price.is_positive() {
            return Err(ValidationError::MissingHammerPrice {
                lot_number: *lot_number,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Charge Validators
// =============================================================================

/// Validates a GST rate in basis points (0% to 100%).
pub fn validate_gst_rate(rate: GstRate) -> ValidationResult<()> {
    if rate.bps() > MAX_GST_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "gstRate".to_string(),
            min: 0,
            max: MAX_GST_RATE_BPS as i64,
        });
    }
    Ok(())
}

/// Validates a packing charge: non-negative amount, sane rate.
pub fn validate_charge(charge: &Charge) -> ValidationResult<()> {
    if charge.amount.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: "packingCharges.amount".to_string(),
        });
    }
    validate_gst_rate(charge.gst_rate)
}

/// Validates an insurance charge.
pub fn validate_insurance(charge: &InsuranceCharge) -> ValidationResult<()> {
    if charge.amount.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: "insuranceCharges.amount".to_string(),
        });
    }
    validate_gst_rate(charge.gst_rate)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_selection() {
        assert!(validate_split_selection("inv-1", &[1, 2, 3], &[1]).is_ok());
        assert!(validate_split_selection("inv-1", &[1, 2, 3], &[2, 3]).is_ok());

        // Empty selection
        assert!(matches!(
            validate_split_selection("inv-1", &[1, 2], &[]),
            Err(ValidationError::EmptyLotSelection)
        ));

        // Whole invoice
        assert!(matches!(
            validate_split_selection("inv-1", &[1, 2], &[1, 2]),
            Err(ValidationError::SplitSelectsAllLots)
        ));

        // Not a subset
        assert!(matches!(
            validate_split_selection("inv-1", &[1, 2], &[9]),
            Err(ValidationError::LotNotOnInvoice { lot_number: 9, .. })
        ));
    }

    #[test]
    fn test_transfer_selection_allows_all_lots() {
        assert!(validate_transfer_selection("inv-1", &[1, 2], &[1, 2]).is_ok());
        assert!(validate_transfer_selection("inv-1", &[1, 2], &[]).is_err());
    }

    #[test]
    fn test_distinct_buyers() {
        assert!(validate_distinct_buyers("buyer-a", "buyer-b").is_ok());
        assert!(matches!(
            validate_distinct_buyers("buyer-a", "buyer-a"),
            Err(ValidationError::SelfTransfer)
        ));
    }

    #[test]
    fn test_assignment_prices() {
        let mut prices = BTreeMap::new();
        prices.insert(10, Money::from_rupees(500));
        assert!(validate_assignment_prices(&prices).is_ok());

        prices.insert(11, Money::zero());
        assert!(matches!(
            validate_assignment_prices(&prices),
            Err(ValidationError::MissingHammerPrice { lot_number: 11 })
        ));

        assert!(validate_assignment_prices(&BTreeMap::new()).is_err());
    }

    #[test]
    fn test_charge_validation() {
        let ok = Charge {
            amount: Money::from_rupees(80),
            gst_rate: GstRate::from_bps(1800),
        };
        assert!(validate_charge(&ok).is_ok());

        let negative = Charge {
            amount: Money::from_paise(-1),
            gst_rate: GstRate::from_bps(1800),
        };
        assert!(validate_charge(&negative).is_err());

        let silly_rate = Charge {
            amount: Money::from_rupees(80),
            gst_rate: GstRate::from_bps(20_000),
        };
        assert!(validate_charge(&silly_rate).is_err());
    }
}
