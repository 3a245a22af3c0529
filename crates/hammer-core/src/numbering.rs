//! # Invoice Numbering
//!
//! Sequential, dense invoice numbers per invoice type, and the
//! renumbering plan applied when an invoice is deleted.
//!
//! Renumbering is modelled as a pure function from "the surviving
//! invoices" to "a batch of `{id, newSequence}` rewrites" so the
//! database layer can apply it atomically and the plan itself can be
//! tested without a store.

use serde::{Deserialize, Serialize};

use crate::types::InvoiceType;

/// Formats the business invoice number for a type and sequence.
///
/// ## Example
/// ```rust
/// use hammer_core::numbering::format_invoice_number;
/// use hammer_core::types::InvoiceType;
///
/// assert_eq!(format_invoice_number(InvoiceType::Customer, 7), "INV-0007");
/// assert_eq!(format_invoice_number(InvoiceType::Asi, 12345), "ASI-12345");
/// ```
pub fn format_invoice_number(invoice_type: InvoiceType, sequence: i64) -> String {
    format!("{}-{:04}", invoice_type.prefix(), sequence)
}

/// One survivor's rewrite in a renumbering batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Renumbering {
    pub invoice_id: String,
    pub old_sequence: i64,
    pub new_sequence: i64,
    /// The rewritten business number for `new_sequence`.
    pub new_number: String,
}

/// Plans the renumbering after deleting the invoice at `deleted_sequence`.
///
/// `survivors` are the remaining same-type invoices as `(id, sequence)`
/// pairs, in any order. Every survivor numbered above the deleted one
/// shifts down by exactly one; the result, applied atomically, leaves
/// the type's numbering dense (1..=N-1 with no gaps). Survivors at or
/// below the deleted sequence are untouched and absent from the plan.
pub fn renumber_after_delete(
    invoice_type: InvoiceType,
    survivors: &[(String, i64)],
    deleted_sequence: i64,
) -> Vec<Renumbering> {
    let mut plan: Vec<Renumbering> = survivors
        .iter()
        .filter(|(_, seq)| *seq > deleted_sequence)
        .map(|(id, seq)| Renumbering {
            invoice_id: id.clone(),
            old_sequence: *seq,
            new_sequence: seq - 1,
            new_number: format_invoice_number(invoice_type, seq - 1),
        })
        .collect();

    // Ascending order so each rewrite moves into a sequence slot that is
    // already free (or just vacated by the delete).
    plan.sort_by_key(|r| r.old_sequence);
    plan
}
