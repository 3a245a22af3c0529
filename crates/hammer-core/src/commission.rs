//! # Buyer's Premium (Commission)
//!
//! Computes the commission block shown on the printed invoice.
//!
//! ## Display-only, by business rule
//! The commission and its GST (9% CGST + 9% SGST on the commission
//! amount) appear on the document but are NOT collected through
//! `amounts.totalPayable` - that total is purely hammer prices + charges
//! + their own GST. The aggregator therefore never calls into this
//! module, and nothing here returns anything the aggregator consumes.
//! Double-counting the commission is the primary correctness risk of the
//! whole engine; the separation is pinned by tests on both sides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{GstRate, Money};
use crate::types::Settings;
use crate::{COMMISSION_CGST_BPS, COMMISSION_SGST_BPS, DEFAULT_BUYER_COMMISSION_BPS};

/// Selects the commission rate for an invoice.
///
/// Invoices dated on/after the cutoff use the global rate; older
/// invoices use the buyer's negotiated rate (default 12% when unset).
///
/// ## Example
/// ```rust
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use hammer_core::commission::commission_rate_for;
/// use hammer_core::money::GstRate;
/// use hammer_core::types::Settings;
///
/// let settings = Settings {
///     global_commission_rate: GstRate::from_bps(1500),
///     commission_cutoff_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
/// };
/// let after = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
/// assert_eq!(commission_rate_for(after, &settings, None).bps(), 1500);
///
/// let before = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(commission_rate_for(before, &settings, None).bps(), 1200);
/// ```
pub fn commission_rate_for(
    invoice_date: DateTime<Utc>,
    settings: &Settings,
    buyer_rate: Option<GstRate>,
) -> GstRate {
    if invoice_date.date_naive() >= settings.commission_cutoff_date {
        settings.global_commission_rate
    } else {
        buyer_rate.unwrap_or(GstRate::from_bps(DEFAULT_BUYER_COMMISSION_BPS))
    }
}

/// The commission block as printed on the invoice. Display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionFigures {
    pub rate: GstRate,
    /// Commission on the hammer total.
    pub amount: Money,
    /// 9% CGST on the commission amount.
    pub cgst: Money,
    /// 9% SGST on the commission amount.
    pub sgst: Money,
}

impl CommissionFigures {
    /// The full display figure (commission + its GST).
    pub fn total(&self) -> Money {
        self.amount + self.cgst + self.sgst
    }
}

/// Computes the display-only commission figures on a hammer total.
pub fn commission_figures(hammer_total: Money, rate: GstRate) -> CommissionFigures {
    let amount = hammer_total.percent_of(rate);
    CommissionFigures {
        rate,
        amount,
        cgst: amount.percent_of(GstRate::from_bps(COMMISSION_CGST_BPS)),
        sgst: amount.percent_of(GstRate::from_bps(COMMISSION_SGST_BPS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::compute_invoice;
    use crate::types::Charges;
    use chrono::{NaiveDate, TimeZone};

    fn settings(cutoff: (i32, u32, u32), global_bps: u32) -> Settings {
        Settings {
            global_commission_rate: GstRate::from_bps(global_bps),
            commission_cutoff_date: NaiveDate::from_ymd_opt(cutoff.0, cutoff.1, cutoff.2)
                .unwrap(),
        }
    }

    #[test]
    fn test_rate_selection_around_cutoff() {
        let settings = settings((2024, 4, 1), 1500);
        let buyer = Some(GstRate::from_bps(1000));

        let on_cutoff = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();
        assert_eq!(commission_rate_for(on_cutoff, &settings, buyer).bps(), 1500);

        let before = Utc.with_ymd_and_hms(2024, 3, 31, 23, 0, 0).unwrap();
        assert_eq!(commission_rate_for(before, &settings, buyer).bps(), 1000);

        // No buyer override before the cutoff: falls back to 12%
        assert_eq!(commission_rate_for(before, &settings, None).bps(), 1200);
    }

    #[test]
    fn test_commission_figures() {
        // 12% of ₹3000 = ₹360; 9% of that = ₹32.40 each head
        let figures = commission_figures(Money::from_rupees(3000), GstRate::from_bps(1200));
        assert_eq!(figures.amount, Money::from_rupees(360));
        assert_eq!(figures.cgst.paise(), 3_240);
        assert_eq!(figures.sgst.paise(), 3_240);
        assert_eq!(figures.total().paise(), 36_000 + 3_240 + 3_240);
    }

    #[test]
    fn test_commission_never_reaches_the_payable_total() {
        // The same lots with or without a commission computation produce
        // the same payable amount; commission is a parallel display path.
        let now = Utc::now();
        let lot = crate::types::Lot {
            id: "lot-1".to_string(),
            auction_id: "auc-1".to_string(),
            lot_number: 1,
            description: "Proof set".to_string(),
            hammer_price: Some(Money::from_rupees(3000)),
            starting_price: None,
            reserve_price: None,
            current_bid: None,
            category: None,
            gst_rate: GstRate::from_bps(500),
            invoice_id: None,
            created_at: now,
            updated_at: now,
        };

        let comp = compute_invoice(std::slice::from_ref(&lot), &Charges::default());
        let figures = commission_figures(lot.hammer(), GstRate::from_bps(1200));

        assert!(figures.amount.is_positive());
        assert_eq!(comp.amounts.total_payable, Money::from_rupees(3000));
    }
}
