//! # Domain Types
//!
//! Core domain types for the settlement engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Lot        │   │     Invoice     │   │     Buyer       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  lotNumber      │   │  invoiceNumber  │   │  paddleNumber   │       │
//! │  │  hammerPrice    │   │  lots (≥ 1)     │   │  commissionRate │       │
//! │  │  invoiceId?     │   │  amounts        │   │  gstin          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InvoiceType    │   │  InvoiceStatus  │   │    GstType      │       │
//! │  │  Customer "INV" │   │  Generated      │   │    CgstSgst     │       │
//! │  │  Vendor   "VEN" │   │  Sent/Paid      │   │    Igst         │       │
//! │  │  Asi      "ASI" │   │  Cancelled      │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: `invoiceNumber`, `(auctionId, lotNumber)`, `paddleNumber`
//!
//! Serde field names follow the persisted record shape exactly
//! (`hammerPrice`, `invoiceNumber`, ...), so these types serialize
//! straight into the interchange format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{GstRate, Money};
use crate::DEFAULT_BUYER_COMMISSION_BPS;

// =============================================================================
// Lot
// =============================================================================

/// A single auctioned item, uniquely numbered within one auction event.
///
/// `invoice_id` is the single source of truth for ownership: a lot with a
/// hammer price belongs to at most one invoice, and only the transfer,
/// split and unsold-assignment operations may move it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Auction event this lot belongs to.
    pub auction_id: String,

    /// Lot number - business identifier, unique within the auction.
    pub lot_number: i64,

    /// Catalogue description shown on the invoice line.
    pub description: String,

    /// Winning bid, inclusive of GST. `None` while the lot is unsold.
    pub hammer_price: Option<Money>,

    /// Opening price in the catalogue.
    pub starting_price: Option<Money>,

    /// Confidential reserve below which the lot does not sell.
    pub reserve_price: Option<Money>,

    /// Highest live bid recorded (unsold lots keep their last bid).
    pub current_bid: Option<Money>,

    /// Catalogue category (coins, notes, stamps, ...).
    pub category: Option<String>,

    /// GST rate applying to this lot's hammer price.
    pub gst_rate: GstRate,

    /// Owning invoice, if settled. The ownership index of the engine.
    pub invoice_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lot {
    /// A lot is unsold until it has a positive hammer price and an owner.
    pub fn is_unsold(&self) -> bool {
        self.invoice_id.is_none() && !self.hammer_price.map_or(false, |p| p.is_positive())
    }

    /// Hammer price, treating unsold as zero.
    #[inline]
    pub fn hammer(&self) -> Money {
        self.hammer_price.unwrap_or_else(Money::zero)
    }
}

// =============================================================================
// Invoice Type
// =============================================================================

/// The ledger an invoice belongs to. Numbering is dense per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    /// Buyer-facing settlement invoice.
    Customer,
    /// Vendor (consignor) settlement.
    Vendor,
    /// After-sale invoice for lots assigned post-auction.
    Asi,
}

impl InvoiceType {
    /// Type-specific invoice number prefix.
    pub const fn prefix(&self) -> &'static str {
        match self {
            InvoiceType::Customer => "INV",
            InvoiceType::Vendor => "VEN",
            InvoiceType::Asi => "ASI",
        }
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// The status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Invoice has been generated but not sent.
    #[default]
    Generated,
    /// Invoice was sent to the buyer.
    Sent,
    /// Payment received in full.
    Paid,
    /// Invoice cancelled (numbering is unaffected; only delete renumbers).
    Cancelled,
}

// =============================================================================
// GST Split
// =============================================================================

/// How the hammer-price GST divides between the tax heads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum GstType {
    /// Intra-state supply: GST splits into equal CGST and SGST halves.
    #[default]
    CgstSgst,
    /// Inter-state supply: the full amount is IGST.
    Igst,
}

/// Precomputed hammer-price GST split (not the commission GST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstSplit {
    pub cgst: Money,
    pub sgst: Money,
    #[serde(rename = "type")]
    pub gst_type: GstType,
}

impl GstSplit {
    /// Splits a hammer-price GST total according to the supply type.
    ///
    /// For intra-state the odd paisa, if any, lands on CGST.
    pub fn of(total_gst: Money, gst_type: GstType) -> Self {
        match gst_type {
            GstType::CgstSgst => {
                let sgst = Money::from_paise(total_gst.paise() / 2);
                GstSplit {
                    cgst: total_gst - sgst,
                    sgst,
                    gst_type,
                }
            }
            GstType::Igst => GstSplit {
                cgst: Money::zero(),
                sgst: Money::zero(),
                gst_type,
            },
        }
    }
}

// =============================================================================
// Charges
// =============================================================================

/// An optional invoice-level charge, GST-inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    /// Amount inclusive of GST.
    pub amount: Money,
    pub gst_rate: GstRate,
}

/// Insurance charge; buyers may decline cover, in which case the charge
/// is kept on record but contributes nothing to the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceCharge {
    pub amount: Money,
    pub gst_rate: GstRate,
    pub declined: bool,
}

/// The optional charges on an invoice, grouped for the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Charges {
    pub packing: Option<Charge>,
    pub insurance: Option<InsuranceCharge>,
}

// =============================================================================
// Amounts
// =============================================================================

/// The only persisted totals: always a pure function of lots + charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amounts {
    /// Signed whole-rupee rounding adjustment.
    pub round_off: Money,
    /// Whole-rupee payable figure.
    pub total_payable: Money,
}

// =============================================================================
// Buyer
// =============================================================================

/// Postal address block as printed on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Buyer identity details carried on the invoice (snapshot pattern:
/// frozen at invoice time, independent of later buyer record edits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDetails {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// GST identification number, when the buyer is registered.
    pub gstin: Option<String>,
    /// Per-buyer commission override, used for invoices dated before the
    /// commission cutoff. Display-only; never posted to the total.
    pub commission_rate: Option<GstRate>,
}

/// A registered auction participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: String,
    pub auction_id: String,
    /// Bidding paddle number - business identifier within the auction.
    pub paddle_number: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub commission_rate: Option<GstRate>,
    pub created_at: DateTime<Utc>,
}

impl Buyer {
    /// Details snapshot for stamping onto an invoice.
    pub fn details(&self) -> BuyerDetails {
        BuyerDetails {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            gstin: self.gstin.clone(),
            commission_rate: self.commission_rate,
        }
    }
}

/// Listing row for buyer pickers (transfer target, unsold assignment).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSummary {
    pub id: String,
    pub auction_id: String,
    pub paddle_number: i64,
    pub name: String,
}

// =============================================================================
// Invoice
// =============================================================================

/// A settlement invoice owning a non-empty ordered set of lots.
///
/// ## Invariants
/// - `lots` is never empty; an operation that would empty it is rejected
///   (a transfer that empties the source deletes the invoice instead)
/// - `gst` and `amounts` are recomputed from `lots` + charges on every
///   mutation, never hand-edited
/// - `(invoice_type, sequence)` is dense: deleting sequence k shifts all
///   higher sequences of the same type down by one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub auction_id: String,
    /// Formatted business number, e.g. `INV-0007`. Rewritten on renumber.
    pub invoice_number: String,
    /// Sequence behind the number; dense per invoice type.
    pub sequence: i64,
    pub invoice_date: DateTime<Utc>,
    pub invoice_type: InvoiceType,
    /// Identity reference to the registered buyer.
    pub buyer: String,
    pub buyer_details: BuyerDetails,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    /// Owned lots, in lot-number order.
    pub lots: Vec<Lot>,
    pub packing_charges: Option<Charge>,
    pub insurance_charges: Option<InsuranceCharge>,
    /// Hammer-price GST split (not the commission GST).
    pub gst: GstSplit,
    pub amounts: Amounts,
    pub status: InvoiceStatus,
    pub sent_to_customer: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// The charges pair in aggregator form.
    pub fn charges(&self) -> Charges {
        Charges {
            packing: self.packing_charges,
            insurance: self.insurance_charges,
        }
    }

    /// Lot numbers currently on the invoice.
    pub fn lot_numbers(&self) -> Vec<i64> {
        self.lots.iter().map(|l| l.lot_number).collect()
    }
}

// =============================================================================
// Operation Payloads
// =============================================================================

/// Arguments for creating an invoice from won lots.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub auction_id: String,
    pub invoice_type: InvoiceType,
    /// Registered buyer id.
    pub buyer: String,
    /// Won lots to settle; must be non-empty and unowned.
    pub lot_numbers: Vec<i64>,
    pub charges: Charges,
    pub gst_type: GstType,
    /// Defaults to now when unset.
    pub invoice_date: Option<DateTime<Utc>>,
}

/// A partial update to an invoice. `None` fields are left unchanged.
///
/// Addresses and charges use a double option: `Some(None)` clears the
/// field, `Some(Some(v))` replaces it. Any change triggers a full
/// recompute of the invoice's totals; the totals themselves cannot be
/// patched.
#[derive(Debug, Clone, Default)]
pub struct InvoicePatch {
    pub invoice_date: Option<DateTime<Utc>>,
    pub billing_address: Option<Option<Address>>,
    pub shipping_address: Option<Option<Address>>,
    pub packing_charges: Option<Option<Charge>>,
    pub insurance_charges: Option<Option<InsuranceCharge>>,
    pub gst_type: Option<GstType>,
    pub status: Option<InvoiceStatus>,
    pub sent_to_customer: Option<bool>,
    /// Lots to drop from the invoice. Released lots keep their hammer
    /// price and can be re-invoiced. Rejected if it would leave the
    /// invoice empty.
    pub remove_lots: Option<Vec<i64>>,
}

/// Result of splitting an invoice in two.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitOutcome {
    /// The source invoice, now owning the complement of the selection.
    pub original: Invoice,
    /// The newly created invoice owning exactly the selected lots.
    pub created: Invoice,
}

/// Result of transferring lots between buyers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    /// The source invoice, or `None` if the transfer emptied and deleted it.
    pub from: Option<Invoice>,
    /// The target buyer's invoice (created on demand).
    pub to: Invoice,
    /// Renumbering applied when the source invoice was deleted.
    pub renumbered: Vec<crate::numbering::Renumbering>,
}

// =============================================================================
// Settings
// =============================================================================

/// Process-wide settlement settings with explicit load/save.
///
/// Passed explicitly into commission rendering; never ambient state and
/// never a component of any persisted total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Commission rate for invoices dated on/after the cutoff.
    pub global_commission_rate: GstRate,
    /// Invoices dated before this use the per-buyer rate instead.
    pub commission_cutoff_date: NaiveDate,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            global_commission_rate: GstRate::from_bps(DEFAULT_BUYER_COMMISSION_BPS),
            // Epoch default: the global rate applies everywhere until the
            // back office saves a real cutoff.
            commission_cutoff_date: NaiveDate::default(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_type_prefix() {
        assert_eq!(InvoiceType::Customer.prefix(), "INV");
        assert_eq!(InvoiceType::Vendor.prefix(), "VEN");
        assert_eq!(InvoiceType::Asi.prefix(), "ASI");
    }

    #[test]
    fn test_gst_split_odd_paisa_goes_to_cgst() {
        let split = GstSplit::of(Money::from_paise(4_763), GstType::CgstSgst);
        assert_eq!(split.cgst.paise(), 2_382);
        assert_eq!(split.sgst.paise(), 2_381);
        assert_eq!(split.cgst + split.sgst, Money::from_paise(4_763));
    }

    #[test]
    fn test_gst_split_igst_has_no_halves() {
        let split = GstSplit::of(Money::from_paise(4_762), GstType::Igst);
        assert!(split.cgst.is_zero());
        assert!(split.sgst.is_zero());
    }

    #[test]
    fn test_lot_unsold() {
        let now = Utc::now();
        let mut lot = Lot {
            id: "lot-1".to_string(),
            auction_id: "auc-1".to_string(),
            lot_number: 10,
            description: "1947 One Rupee note".to_string(),
            hammer_price: None,
            starting_price: Some(Money::from_rupees(500)),
            reserve_price: None,
            current_bid: None,
            category: Some("notes".to_string()),
            gst_rate: GstRate::from_bps(500),
            invoice_id: None,
            created_at: now,
            updated_at: now,
        };
        assert!(lot.is_unsold());
        assert!(lot.hammer().is_zero());

        lot.hammer_price = Some(Money::from_rupees(1000));
        lot.invoice_id = Some("inv-1".to_string());
        assert!(!lot.is_unsold());
    }

    #[test]
    fn test_serde_field_names_match_record_shape() {
        let amounts = Amounts {
            round_off: Money::from_paise(49),
            total_payable: Money::from_rupees(3100),
        };
        let json = serde_json::to_value(&amounts).unwrap();
        assert_eq!(json["roundOff"], 49);
        assert_eq!(json["totalPayable"], 310_000);

        let split = GstSplit::of(Money::from_paise(100), GstType::CgstSgst);
        let json = serde_json::to_value(&split).unwrap();
        assert!(json.get("type").is_some());
    }
}
