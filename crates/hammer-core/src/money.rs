//! # Money Module
//!
//! Provides the `Money` type and the price-inclusive GST math.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A hammer price of ₹1000 at 5% GST decomposed in floating point:        │
//! │    base = 1000 / 1.05 = 952.3809523809524...                            │
//! │                                                                         │
//! │  Repeat that across reverse-GST, splitting, transferring and            │
//! │  re-aggregating an invoice and the paise drift - the printed invoice    │
//! │  stops matching the books.                                              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    base  = round(100000 × 10000 / 10500) = 95238 paise                  │
//! │    gst   = 100000 − 95238 = 4762 paise                                  │
//! │    base + gst == inclusive, EXACTLY, every time                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hammer_core::money::{GstRate, Money};
//!
//! // Create from paise (preferred)
//! let hammer = Money::from_paise(100_000); // ₹1000.00
//!
//! // Reverse GST: derive the pre-tax base from the inclusive price
//! let breakup = hammer.reverse_gst(GstRate::from_bps(500)); // 5%
//! assert_eq!(breakup.base + breakup.gst, hammer);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for round-off adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every hammer price, charge, GST amount, and total in the settlement
/// engine flows through this type. The UI converts to rupees for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use hammer_core::money::Money;
    ///
    /// let price = Money::from_rupees(1000);
    /// assert_eq!(price.paise(), 100_000);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Decomposes a GST-inclusive amount into base and GST.
    ///
    /// ## Reverse GST
    /// Hammer prices and charges are quoted inclusive of GST, so the tax
    /// is peeled *out* of the price rather than added on top:
    ///
    /// ```text
    /// base = inclusive × 10000 / (10000 + bps)   (half away from zero)
    /// gst  = inclusive − base
    /// ```
    ///
    /// Deriving `gst` as the remainder keeps `base + gst == inclusive`
    /// exact for every input, which the per-rate summary relies on.
    ///
    /// ## Example
    /// ```rust
    /// use hammer_core::money::{GstRate, Money};
    ///
    /// let hammer = Money::from_paise(100_000); // ₹1000 inclusive
    /// let breakup = hammer.reverse_gst(GstRate::from_bps(500)); // 5%
    /// assert_eq!(breakup.base.paise(), 95_238);
    /// assert_eq!(breakup.gst.paise(), 4_762);
    /// ```
    pub fn reverse_gst(&self, rate: GstRate) -> GstBreakup {
        if rate.is_zero() {
            return GstBreakup {
                base: *self,
                gst: Money::zero(),
            };
        }

        // Use i128 to prevent overflow on large amounts
        let base = div_round_half_away(self.0 as i128 * 10_000, 10_000 + rate.bps() as i128);
        GstBreakup {
            base: Money::from_paise(base),
            gst: Money::from_paise(self.0 - base),
        }
    }

    /// Computes a percentage of this amount, rounding half away from zero.
    ///
    /// Used for the display-only commission figures; never feeds the
    /// payable total.
    pub fn percent_of(&self, rate: GstRate) -> Money {
        let amount = div_round_half_away(self.0 as i128 * rate.bps() as i128, 10_000);
        Money::from_paise(amount)
    }

    /// Rounds to the nearest whole rupee and reports the adjustment.
    ///
    /// ## Round-Off
    /// The payable total on a printed invoice is a whole-rupee figure.
    /// `round_off` is the signed paise adjustment applied to get there:
    ///
    /// ```text
    /// total_payable = round-half-away-from-zero(x)   (to whole rupees)
    /// round_off     = total_payable − x              (|round_off| < ₹1)
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use hammer_core::money::Money;
    ///
    /// let raw = Money::from_paise(309_951); // ₹3099.51
    /// let rounding = raw.round_total();
    /// assert_eq!(rounding.total_payable.paise(), 310_000); // ₹3100
    /// assert_eq!(rounding.round_off.paise(), 49);          // +₹0.49
    /// ```
    pub fn round_total(&self) -> Rounding {
        let rupees = div_round_half_away(self.0 as i128, 100);
        let total = Money::from_paise(rupees * 100);
        Rounding {
            round_off: total - *self,
            total_payable: total,
        }
    }
}

/// Integer division rounding half away from zero. `d` must be positive.
const fn div_round_half_away(n: i128, d: i128) -> i64 {
    let q = if n >= 0 {
        (2 * n + d) / (2 * d)
    } else {
        (2 * n - d) / (2 * d)
    };
    q as i64
}

// =============================================================================
// GST Rate
// =============================================================================

/// A GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5% (coins/notes), 1800 bps = 18% (packing/insurance services)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct GstRate(u32);

impl GstRate {
    /// Creates a GST rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    /// Creates a GST rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        GstRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero GST rate.
    #[inline]
    pub const fn zero() -> Self {
        GstRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// A GST-inclusive amount decomposed into pre-tax base and GST.
///
/// Invariant: `base + gst` equals the inclusive amount it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstBreakup {
    pub base: Money,
    pub gst: Money,
}

/// A raw total rounded to whole rupees, with the signed adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rounding {
    /// Signed paise adjustment (`total_payable - raw`). Always under ₹1.
    pub round_off: Money,
    /// Whole-rupee payable figure.
    pub total_payable: Money,
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs. The printed invoice formats amounts itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity-style calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, n: i64) -> Self {
        Money(self.0 * n)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(109_951);
        assert_eq!(money.paise(), 109_951);
        assert_eq!(money.rupees(), 1099);
        assert_eq!(money.paise_part(), 51);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(109_951)), "₹1099.51");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);
    }

    #[test]
    fn test_reverse_gst_identity() {
        // base + gst must reconstruct the inclusive amount exactly
        for paise in [0, 1, 99, 100_000, 200_000, 123_457, 8_000] {
            for bps in [0, 300, 500, 1200, 1800, 2800] {
                let inclusive = Money::from_paise(paise);
                let breakup = inclusive.reverse_gst(GstRate::from_bps(bps));
                assert_eq!(breakup.base + breakup.gst, inclusive, "paise={paise} bps={bps}");
            }
        }
    }

    #[test]
    fn test_reverse_gst_five_percent() {
        // ₹1000 inclusive at 5%: base ₹952.38, gst ₹47.62
        let breakup = Money::from_paise(100_000).reverse_gst(GstRate::from_bps(500));
        assert_eq!(breakup.base.paise(), 95_238);
        assert_eq!(breakup.gst.paise(), 4_762);
    }

    #[test]
    fn test_reverse_gst_zero_rate() {
        let inclusive = Money::from_paise(12_345);
        let breakup = inclusive.reverse_gst(GstRate::zero());
        assert_eq!(breakup.base, inclusive);
        assert!(breakup.gst.is_zero());
    }

    #[test]
    fn test_round_total_half_away_from_zero() {
        // .50 rounds up, not to even
        let rounding = Money::from_paise(150).round_total();
        assert_eq!(rounding.total_payable.paise(), 200);
        assert_eq!(rounding.round_off.paise(), 50);

        let rounding = Money::from_paise(149).round_total();
        assert_eq!(rounding.total_payable.paise(), 100);
        assert_eq!(rounding.round_off.paise(), -49);

        let rounding = Money::from_paise(-150).round_total();
        assert_eq!(rounding.total_payable.paise(), -200);
        assert_eq!(rounding.round_off.paise(), -50);
    }

    #[test]
    fn test_round_total_bounds() {
        for paise in [0, 49, 50, 51, 99, 100, 309_951, -251] {
            let rounding = Money::from_paise(paise).round_total();
            assert_eq!(rounding.total_payable.paise() % 100, 0);
            assert!(rounding.round_off.abs().paise() < 100);
            assert_eq!(
                rounding.total_payable,
                Money::from_paise(paise) + rounding.round_off
            );
        }
    }

    #[test]
    fn test_percent_of() {
        // 12% commission on ₹3000
        let commission = Money::from_paise(300_000).percent_of(GstRate::from_bps(1200));
        assert_eq!(commission.paise(), 36_000);
    }

    #[test]
    fn test_gst_rate_conversions() {
        let rate = GstRate::from_bps(500);
        assert_eq!(rate.bps(), 500);
        assert!((rate.percentage() - 5.0).abs() < 0.001);
        assert_eq!(GstRate::from_percentage(18.0).bps(), 1800);
    }
}
