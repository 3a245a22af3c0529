//! # Amount In Words
//!
//! Converts integers to words using the Indian numbering system
//! (thousand / lakh / crore groups). The printed invoice carries the
//! payable total spelled out, e.g. `₹3100` → "Three Thousand One Hundred
//! Rupees Only".

use crate::money::Money;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Converts a non-negative integer to words, Indian numbering.
///
/// ## Examples
/// ```rust
/// use hammer_core::words::number_to_words;
///
/// assert_eq!(number_to_words(0), "Zero");
/// assert_eq!(number_to_words(100_000), "One Lakh");
/// assert_eq!(
///     number_to_words(1_234_567),
///     "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven"
/// );
/// ```
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    push_words(n, &mut parts);
    parts.join(" ")
}

/// Spells a Money amount for the printed invoice.
///
/// Negative amounts are prefixed with "Minus" (round-off display only;
/// a payable total is never negative in practice).
///
/// ## Examples
/// ```rust
/// use hammer_core::money::Money;
/// use hammer_core::words::amount_in_words;
///
/// assert_eq!(
///     amount_in_words(Money::from_rupees(3100)),
///     "Three Thousand One Hundred Rupees Only"
/// );
/// assert_eq!(
///     amount_in_words(Money::from_paise(150_050)),
///     "One Thousand Five Hundred Rupees and Fifty Paise Only"
/// );
/// ```
pub fn amount_in_words(amount: Money) -> String {
    let prefix = if amount.is_negative() { "Minus " } else { "" };
    let rupees = amount.rupees().unsigned_abs();
    let paise = amount.paise_part() as u64;

    match (rupees, paise) {
        (0, 0) => "Zero Rupees Only".to_string(),
        (r, 0) => format!("{}{} Rupees Only", prefix, number_to_words(r)),
        (0, p) => format!("{}{} Paise Only", prefix, number_to_words(p)),
        (r, p) => format!(
            "{}{} Rupees and {} Paise Only",
            prefix,
            number_to_words(r),
            number_to_words(p)
        ),
    }
}

/// Appends the word groups for `n` (> 0) onto `parts`.
///
/// Indian grouping: the lowest three digits split into hundreds/tens,
/// then two-digit groups for thousand and lakh, then crore recurses so
/// arbitrarily large totals stay well-formed ("Twelve Crore ...").
fn push_words(n: u64, parts: &mut Vec<String>) {
    if n >= 10_000_000 {
        push_words(n / 10_000_000, parts);
        parts.push("Crore".to_string());
        push_words_below_crore(n % 10_000_000, parts);
    } else {
        push_words_below_crore(n, parts);
    }
}

fn push_words_below_crore(n: u64, parts: &mut Vec<String>) {
    let lakh = n / 100_000;
    let thousand = (n % 100_000) / 1_000;
    let hundred = (n % 1_000) / 100;
    let rest = n % 100;

    if lakh > 0 {
        push_two_digit(lakh, parts);
        parts.push("Lakh".to_string());
    }
    if thousand > 0 {
        push_two_digit(thousand, parts);
        parts.push("Thousand".to_string());
    }
    if hundred > 0 {
        parts.push(ONES[hundred as usize].to_string());
        parts.push("Hundred".to_string());
    }
    if rest > 0 {
        push_two_digit(rest, parts);
    }
}

fn push_two_digit(n: u64, parts: &mut Vec<String>) {
    debug_assert!(n < 100);
    if n == 0 {
        return;
    }
    if n < 20 {
        parts.push(ONES[n as usize].to_string());
    } else {
        parts.push(TENS[(n / 10) as usize].to_string());
        if n % 10 > 0 {
            parts.push(ONES[(n % 10) as usize].to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_values() {
        assert_eq!(number_to_words(0), "Zero");
        assert_eq!(number_to_words(7), "Seven");
        assert_eq!(number_to_words(14), "Fourteen");
        assert_eq!(number_to_words(40), "Forty");
        assert_eq!(number_to_words(100), "One Hundred");
        assert_eq!(number_to_words(1_500), "One Thousand Five Hundred");
        assert_eq!(number_to_words(100_000), "One Lakh");
        assert_eq!(number_to_words(10_000_000), "One Crore");
    }

    #[test]
    fn test_full_grouping() {
        assert_eq!(
            number_to_words(1_234_567),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven"
        );
        assert_eq!(
            number_to_words(12_34_56_789),
            "Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine"
        );
        // Internal zero groups are skipped, not spelled
        assert_eq!(number_to_words(10_00_001), "Ten Lakh One");
    }

    #[test]
    fn test_amount_in_words() {
        assert_eq!(
            amount_in_words(Money::from_rupees(3_100)),
            "Three Thousand One Hundred Rupees Only"
        );
        assert_eq!(
            amount_in_words(Money::from_paise(150_050)),
            "One Thousand Five Hundred Rupees and Fifty Paise Only"
        );
        assert_eq!(amount_in_words(Money::zero()), "Zero Rupees Only");
        assert_eq!(amount_in_words(Money::from_paise(49)), "Forty Nine Paise Only");
    }
}
