//! # Invoice Aggregator
//!
//! Turns an invoice's lots and optional charges into line-level GST
//! breakups, a per-rate summary, and the payable amounts.
//!
//! This is a pure function of its inputs: the stored `gst` and `amounts`
//! on an invoice are always the output of [`compute_invoice`] over its
//! current lot list, never cached independently of the lots.

use serde::{Deserialize, Serialize};

use crate::money::{GstRate, Money};
use crate::types::{Amounts, Charges, GstSplit, GstType, Lot};

// =============================================================================
// Line Breakup
// =============================================================================

/// One settled line: a lot's hammer price or an invoice-level charge,
/// decomposed into pre-tax base and GST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBreakup {
    /// Printed line label ("Lot 10", "Packing", "Insurance").
    pub label: String,
    /// Lot number for lot lines, `None` for charges.
    pub lot_number: Option<i64>,
    /// GST-inclusive line amount.
    pub inclusive: Money,
    pub gst_rate: GstRate,
    pub base: Money,
    pub gst: Money,
}

/// One row of the per-rate GST summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstSlab {
    pub rate: GstRate,
    /// Sum of pre-tax bases at this rate.
    pub taxable_value: Money,
    /// Sum of GST amounts at this rate.
    pub gst_amount: Money,
}

/// The aggregator's full output for one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceComputation {
    pub lines: Vec<LineBreakup>,
    pub gst_summary: Vec<GstSlab>,
    /// Σ base across all lines.
    pub gross_amount: Money,
    /// Σ gst across all lines.
    pub total_gst: Money,
    /// GST from hammer-price lines only; feeds the invoice's CGST/SGST
    /// split, which excludes charge GST by the record shape.
    pub lot_gst: Money,
    pub amounts: Amounts,
}

impl InvoiceComputation {
    /// The invoice-level GST split for the given supply type.
    pub fn gst_split(&self, gst_type: GstType) -> GstSplit {
        GstSplit::of(self.lot_gst, gst_type)
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Computes line breakups, GST summary, and payable amounts for one
/// invoice from its lots and optional charges.
///
/// - Lots appear first in input order, then packing, then insurance.
/// - Insurance with `declined == true` contributes nothing.
/// - Commission and its GST are display-only and deliberately absent
///   here; the payable total is hammer prices + charges + their own GST.
///
/// ## Example
/// ```rust
/// use hammer_core::aggregate::compute_invoice;
/// use hammer_core::types::Charges;
///
/// let comp = compute_invoice(&[], &Charges::default());
/// assert!(comp.amounts.total_payable.is_zero());
/// ```
pub fn compute_invoice(lots: &[Lot], charges: &Charges) -> InvoiceComputation {
    let mut lines = Vec::with_capacity(lots.len() + 2);
    let mut lot_gst = Money::zero();

    for lot in lots {
        let breakup = lot.hammer().reverse_gst(lot.gst_rate);
        lot_gst += breakup.gst;
        lines.push(LineBreakup {
            label: format!("Lot {}", lot.lot_number),
            lot_number: Some(lot.lot_number),
            inclusive: lot.hammer(),
            gst_rate: lot.gst_rate,
            base: breakup.base,
            gst: breakup.gst,
        });
    }

    if let Some(packing) = charges.packing {
        let breakup = packing.amount.reverse_gst(packing.gst_rate);
        lines.push(LineBreakup {
            label: "Packing".to_string(),
            lot_number: None,
            inclusive: packing.amount,
            gst_rate: packing.gst_rate,
            base: breakup.base,
            gst: breakup.gst,
        });
    }

    if let Some(insurance) = charges.insurance {
        if !insurance.declined {
            let breakup = insurance.amount.reverse_gst(insurance.gst_rate);
            lines.push(LineBreakup {
                label: "Insurance".to_string(),
                lot_number: None,
                inclusive: insurance.amount,
                gst_rate: insurance.gst_rate,
                base: breakup.base,
                gst: breakup.gst,
            });
        }
    }

    let gross_amount: Money = lines.iter().map(|l| l.base).sum();
    let total_gst: Money = lines.iter().map(|l| l.gst).sum();
    let gst_summary = aggregate_by_rate(&lines);
    let rounding = (gross_amount + total_gst).round_total();

    InvoiceComputation {
        lines,
        gst_summary,
        gross_amount,
        total_gst,
        lot_gst,
        amounts: Amounts {
            round_off: rounding.round_off,
            total_payable: rounding.total_payable,
        },
    }
}

/// Groups base/GST sums by GST rate.
///
/// Output order is the insertion order of each rate's first occurrence -
/// stable for a given input order, which is what the printed summary
/// table needs.
pub fn aggregate_by_rate(lines: &[LineBreakup]) -> Vec<GstSlab> {
    let mut slabs: Vec<GstSlab> = Vec::new();

    for line in lines {
        match slabs.iter_mut().find(|s| s.rate == line.gst_rate) {
            Some(slab) => {
                slab.taxable_value += line.base;
                slab.gst_amount += line.gst;
            }
            None => slabs.push(GstSlab {
                rate: line.gst_rate,
                taxable_value: line.base,
                gst_amount: line.gst,
            }),
        }
    }

    slabs
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Charge, InsuranceCharge};
    use chrono::Utc;

    fn test_lot(lot_number: i64, hammer_rupees: i64, gst_bps: u32) -> Lot {
        let now = Utc::now();
        Lot {
            id: format!("lot-{lot_number}"),
            auction_id: "auc-1".to_string(),
            lot_number,
            description: format!("Lot {lot_number}"),
            hammer_price: Some(Money::from_rupees(hammer_rupees)),
            starting_price: None,
            reserve_price: None,
            current_bid: None,
            category: None,
            gst_rate: GstRate::from_bps(gst_bps),
            invoice_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_end_to_end_two_lots_and_packing() {
        // Lot #10 ₹1000 @5%, lot #11 ₹2000 @5%, packing ₹80 @18%
        let lots = vec![test_lot(10, 1000, 500), test_lot(11, 2000, 500)];
        let charges = Charges {
            packing: Some(Charge {
                amount: Money::from_rupees(80),
                gst_rate: GstRate::from_bps(1800),
            }),
            insurance: None,
        };

        let comp = compute_invoice(&lots, &charges);

        // base + gst reconstructs each inclusive line exactly
        for line in &comp.lines {
            assert_eq!(line.base + line.gst, line.inclusive);
        }

        // gross + gst == Σ inclusive == ₹3080, already whole rupees
        assert_eq!(comp.gross_amount.paise(), 95_238 + 190_476 + 6_780);
        assert_eq!(comp.total_gst.paise(), 4_762 + 9_524 + 1_220);
        assert_eq!(comp.amounts.total_payable, Money::from_rupees(3080));
        assert!(comp.amounts.round_off.is_zero());
        assert_eq!(comp.amounts.total_payable.paise() % 100, 0);

        // lot GST excludes the packing slab
        assert_eq!(comp.lot_gst.paise(), 4_762 + 9_524);
    }

    #[test]
    fn test_gst_summary_groups_by_rate_in_first_occurrence_order() {
        let lots = vec![
            test_lot(1, 1000, 500),
            test_lot(2, 500, 1200),
            test_lot(3, 2000, 500),
        ];
        let comp = compute_invoice(&lots, &Charges::default());

        assert_eq!(comp.gst_summary.len(), 2);
        assert_eq!(comp.gst_summary[0].rate.bps(), 500);
        assert_eq!(comp.gst_summary[1].rate.bps(), 1200);

        // 5% slab aggregates lots 1 and 3
        assert_eq!(
            comp.gst_summary[0].taxable_value.paise(),
            95_238 + 190_476
        );

        // slab sums reconcile with the invoice totals
        let slab_base: Money = comp.gst_summary.iter().map(|s| s.taxable_value).sum();
        let slab_gst: Money = comp.gst_summary.iter().map(|s| s.gst_amount).sum();
        assert_eq!(slab_base, comp.gross_amount);
        assert_eq!(slab_gst, comp.total_gst);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let lots = vec![test_lot(1, 1234, 500), test_lot(2, 567, 1800)];
        let a = compute_invoice(&lots, &Charges::default());
        let b = compute_invoice(&lots, &Charges::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_declined_insurance_contributes_nothing() {
        let lots = vec![test_lot(1, 1000, 500)];
        let with_declined = Charges {
            packing: None,
            insurance: Some(InsuranceCharge {
                amount: Money::from_rupees(120),
                gst_rate: GstRate::from_bps(1800),
                declined: true,
            }),
        };

        let comp = compute_invoice(&lots, &with_declined);
        let bare = compute_invoice(&lots, &Charges::default());
        assert_eq!(comp.amounts, bare.amounts);
        assert_eq!(comp.lines.len(), 1);
    }

    #[test]
    fn test_unsold_lot_counts_as_zero() {
        let mut lot = test_lot(1, 0, 500);
        lot.hammer_price = None;
        let comp = compute_invoice(&[lot], &Charges::default());
        assert!(comp.amounts.total_payable.is_zero());
    }

    #[test]
    fn test_gst_split_from_computation() {
        let lots = vec![test_lot(1, 1000, 500)];
        let comp = compute_invoice(&lots, &Charges::default());
        let split = comp.gst_split(GstType::CgstSgst);
        assert_eq!(split.cgst + split.sgst, comp.lot_gst);
    }
}
