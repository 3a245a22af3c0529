//! # Invoice Repository
//!
//! Database operations for settlement invoices: creation, patching,
//! delete-with-renumber, split, transfer, and unsold assignment.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Every mutating operation                               │
//! │                                                                         │
//! │  1. VALIDATE  ── pure checks (hammer-core::validation), no writes      │
//! │  2. BEGIN     ── one transaction for the whole operation               │
//! │  3. MOVE      ── guarded lot UPDATEs; rows_affected()==0 is a race     │
//! │  4. RECOMPUTE ── totals from lots + charges (hammer-core::aggregate)   │
//! │  5. COMMIT    ── or roll back whole; no partial settlement exists      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Numbering
//! `(invoice_type, sequence)` is dense per type. Deleting sequence k
//! shifts every higher survivor down by one, in ascending order, inside
//! the delete's own transaction - the freed slot keeps the UNIQUE index
//! satisfied at every step. Concurrent writers that race a renumbering
//! or a create land on the UNIQUE index and surface as `Conflict`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::buyer::BuyerRow;
use crate::repository::lot::{LotRow, LOT_COLUMNS};
use hammer_core::aggregate::compute_invoice;
use hammer_core::numbering::{format_invoice_number, renumber_after_delete, Renumbering};
use hammer_core::validation::{
    validate_assignment_prices, validate_charge, validate_distinct_buyers, validate_insurance,
    validate_split_selection, validate_transfer_selection,
};
use hammer_core::{
    Address, Amounts, Buyer, BuyerDetails, Charge, Charges, GstRate, GstSplit, GstType,
    InsuranceCharge, Invoice, InvoicePatch, InvoiceStatus, InvoiceType, Lot, Money, NewInvoice,
    SplitOutcome, TransferOutcome, ValidationError,
};

// =============================================================================
// Row Mapping
// =============================================================================

/// Database row shape for an invoice; money columns are raw paise,
/// addresses are JSON text.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    auction_id: String,
    invoice_type: InvoiceType,
    sequence: i64,
    invoice_number: String,
    invoice_date: DateTime<Utc>,
    buyer_id: String,
    buyer_name: String,
    buyer_phone: Option<String>,
    buyer_email: Option<String>,
    buyer_gstin: Option<String>,
    buyer_commission_bps: Option<u32>,
    billing_address: Option<String>,
    shipping_address: Option<String>,
    packing_amount_paise: Option<i64>,
    packing_gst_bps: Option<u32>,
    insurance_amount_paise: Option<i64>,
    insurance_gst_bps: Option<u32>,
    insurance_declined: bool,
    gst_type: GstType,
    cgst_paise: i64,
    sgst_paise: i64,
    round_off_paise: i64,
    total_payable_paise: i64,
    status: InvoiceStatus,
    sent_to_customer: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const INVOICE_COLUMNS: &str = "id, auction_id, invoice_type, sequence, invoice_number, \
     invoice_date, buyer_id, buyer_name, buyer_phone, buyer_email, buyer_gstin, \
     buyer_commission_bps, billing_address, shipping_address, \
     packing_amount_paise, packing_gst_bps, \
     insurance_amount_paise, insurance_gst_bps, insurance_declined, \
     gst_type, cgst_paise, sgst_paise, round_off_paise, total_payable_paise, \
     status, sent_to_customer, created_at, updated_at";

impl InvoiceRow {
    fn packing(&self) -> Option<Charge> {
        match (self.packing_amount_paise, self.packing_gst_bps) {
            (Some(amount), Some(bps)) => Some(Charge {
                amount: Money::from_paise(amount),
                gst_rate: GstRate::from_bps(bps),
            }),
            _ => None,
        }
    }

    fn insurance(&self) -> Option<InsuranceCharge> {
        match (self.insurance_amount_paise, self.insurance_gst_bps) {
            (Some(amount), Some(bps)) => Some(InsuranceCharge {
                amount: Money::from_paise(amount),
                gst_rate: GstRate::from_bps(bps),
                declined: self.insurance_declined,
            }),
            _ => None,
        }
    }

    fn charges(&self) -> Charges {
        Charges {
            packing: self.packing(),
            insurance: self.insurance(),
        }
    }

    fn into_invoice(self, lots: Vec<Lot>) -> DbResult<Invoice> {
        let billing_address: Option<Address> = self
            .billing_address
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let shipping_address: Option<Address> = self
            .shipping_address
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let packing_charges = self.packing();
        let insurance_charges = self.insurance();

        Ok(Invoice {
            id: self.id,
            auction_id: self.auction_id,
            invoice_number: self.invoice_number,
            sequence: self.sequence,
            invoice_date: self.invoice_date,
            invoice_type: self.invoice_type,
            buyer: self.buyer_id,
            buyer_details: BuyerDetails {
                name: self.buyer_name,
                phone: self.buyer_phone,
                email: self.buyer_email,
                gstin: self.buyer_gstin,
                commission_rate: self.buyer_commission_bps.map(GstRate::from_bps),
            },
            billing_address,
            shipping_address,
            lots,
            packing_charges,
            insurance_charges,
            gst: GstSplit {
                cgst: Money::from_paise(self.cgst_paise),
                sgst: Money::from_paise(self.sgst_paise),
                gst_type: self.gst_type,
            },
            amounts: Amounts {
                round_off: Money::from_paise(self.round_off_paise),
                total_payable: Money::from_paise(self.total_payable_paise),
            },
            status: self.status,
            sent_to_customer: self.sent_to_customer,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn fetch_invoice_row(conn: &mut SqliteConnection, id: &str) -> DbResult<InvoiceRow> {
    sqlx::query_as::<_, InvoiceRow>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| DbError::not_found("Invoice", id))
}

async fn fetch_lots(conn: &mut SqliteConnection, invoice_id: &str) -> DbResult<Vec<Lot>> {
    let rows = sqlx::query_as::<_, LotRow>(&format!(
        "SELECT {LOT_COLUMNS} FROM lots WHERE invoice_id = ?1 ORDER BY lot_number"
    ))
    .bind(invoice_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(Lot::from).collect())
}

async fn load_invoice(conn: &mut SqliteConnection, id: &str) -> DbResult<Invoice> {
    let row = fetch_invoice_row(conn, id).await?;
    let lots = fetch_lots(conn, id).await?;
    row.into_invoice(lots)
}

/// Resolves a buyer within an auction.
///
/// The auction filter matters: a buyer registered only in some other
/// auction is not a valid participant here, and resolving them by id
/// alone would let an invoice land in an auction they never entered.
async fn fetch_buyer(
    conn: &mut SqliteConnection,
    auction_id: &str,
    buyer_id: &str,
) -> DbResult<Buyer> {
    let row = sqlx::query_as::<_, BuyerRow>(
        "SELECT id, auction_id, paddle_number, name, phone, email, gstin, \
         commission_rate_bps, created_at FROM buyers WHERE id = ?1 AND auction_id = ?2",
    )
    .bind(buyer_id)
    .bind(auction_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| DbError::not_found("Buyer", buyer_id))?;

    Ok(row.into())
}

/// Next free sequence for a type: MAX + 1 under the transaction.
///
/// Two creates racing the same type both compute the same value; the
/// UNIQUE index rejects the loser as a `Conflict`.
async fn next_sequence(conn: &mut SqliteConnection, invoice_type: InvoiceType) -> DbResult<i64> {
    let next: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(sequence), 0) + 1 FROM invoices WHERE invoice_type = ?1")
            .bind(invoice_type)
            .fetch_one(conn)
            .await?;

    Ok(next)
}

/// Inserts an invoice row with zero totals, to be recomputed once its
/// lots are claimed. The buyer details are frozen onto the row here.
#[allow(clippy::too_many_arguments)]
async fn insert_shell(
    conn: &mut SqliteConnection,
    auction_id: &str,
    invoice_type: InvoiceType,
    sequence: i64,
    buyer: &Buyer,
    charges: &Charges,
    gst_type: GstType,
    invoice_date: DateTime<Utc>,
) -> DbResult<String> {
    let id = Uuid::new_v4().to_string();
    let invoice_number = format_invoice_number(invoice_type, sequence);
    let now = Utc::now();

    debug!(id = %id, invoice_number = %invoice_number, "Inserting invoice");

    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, auction_id, invoice_type, sequence, invoice_number, invoice_date,
            buyer_id, buyer_name, buyer_phone, buyer_email, buyer_gstin,
            buyer_commission_bps,
            packing_amount_paise, packing_gst_bps,
            insurance_amount_paise, insurance_gst_bps, insurance_declined,
            gst_type, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11,
            ?12,
            ?13, ?14,
            ?15, ?16, ?17,
            ?18, ?19, ?19
        )
        "#,
    )
    .bind(&id)
    .bind(auction_id)
    .bind(invoice_type)
    .bind(sequence)
    .bind(&invoice_number)
    .bind(invoice_date)
    .bind(&buyer.id)
    .bind(&buyer.name)
    .bind(&buyer.phone)
    .bind(&buyer.email)
    .bind(&buyer.gstin)
    .bind(buyer.commission_rate.map(|r| r.bps()))
    .bind(charges.packing.map(|c| c.amount.paise()))
    .bind(charges.packing.map(|c| c.gst_rate.bps()))
    .bind(charges.insurance.map(|c| c.amount.paise()))
    .bind(charges.insurance.map(|c| c.gst_rate.bps()))
    .bind(charges.insurance.map(|c| c.declined).unwrap_or(false))
    .bind(gst_type)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(id)
}

/// Claims an invoiceable lot for an invoice.
///
/// Guarded UPDATE: the WHERE clause demands an unowned lot with a
/// positive hammer price, so a zero row count is diagnosed rather than
/// trusted.
async fn claim_lot(
    conn: &mut SqliteConnection,
    auction_id: &str,
    lot_number: i64,
    invoice_id: &str,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE lots SET invoice_id = ?3, updated_at = ?4
        WHERE auction_id = ?1 AND lot_number = ?2
          AND invoice_id IS NULL
          AND COALESCE(hammer_price_paise, 0) > 0
        "#,
    )
    .bind(auction_id)
    .bind(lot_number)
    .bind(invoice_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    // Diagnose: missing lot, unsold lot, or lost ownership race.
    let row: Option<(Option<i64>, Option<String>)> = sqlx::query_as(
        "SELECT hammer_price_paise, invoice_id FROM lots \
         WHERE auction_id = ?1 AND lot_number = ?2",
    )
    .bind(auction_id)
    .bind(lot_number)
    .fetch_optional(conn)
    .await?;

    match row {
        None => Err(DbError::not_found("Lot", lot_number.to_string())),
        Some((_, Some(owner))) => Err(DbError::conflict(format!(
            "Lot {lot_number} is already on invoice {owner}"
        ))),
        Some((_, None)) => Err(ValidationError::MissingHammerPrice { lot_number }.into()),
    }
}

/// Moves a lot between two invoices, guarded on the expected source.
async fn move_lot(
    conn: &mut SqliteConnection,
    from_invoice: &str,
    lot_number: i64,
    to_invoice: &str,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE lots SET invoice_id = ?3, updated_at = ?4 \
         WHERE invoice_id = ?1 AND lot_number = ?2",
    )
    .bind(from_invoice)
    .bind(lot_number)
    .bind(to_invoice)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict(format!(
            "Lot {lot_number} left invoice {from_invoice} in a concurrent operation"
        )));
    }

    Ok(())
}

/// Releases a lot from its invoice. The hammer price survives: the lot
/// stays won, just uninvoiced, and a later create can claim it again.
async fn release_lot(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    lot_number: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE lots SET invoice_id = NULL, updated_at = ?3 \
         WHERE invoice_id = ?1 AND lot_number = ?2",
    )
    .bind(invoice_id)
    .bind(lot_number)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ValidationError::LotNotOnInvoice {
            invoice_id: invoice_id.to_string(),
            lot_number,
        }
        .into());
    }

    Ok(())
}

/// Recomputes and persists an invoice's GST split and payable amounts
/// from its current lots and charges.
async fn recompute_totals(conn: &mut SqliteConnection, invoice_id: &str) -> DbResult<()> {
    let row = fetch_invoice_row(&mut *conn, invoice_id).await?;
    let lots = fetch_lots(&mut *conn, invoice_id).await?;

    let computation = compute_invoice(&lots, &row.charges());
    let split = computation.gst_split(row.gst_type);

    sqlx::query(
        r#"
        UPDATE invoices SET
            cgst_paise = ?2,
            sgst_paise = ?3,
            round_off_paise = ?4,
            total_payable_paise = ?5,
            updated_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(invoice_id)
    .bind(split.cgst.paise())
    .bind(split.sgst.paise())
    .bind(computation.amounts.round_off.paise())
    .bind(computation.amounts.total_payable.paise())
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(())
}

/// Deletes an invoice row, releases its lots, and closes the numbering
/// gap for its type. Returns the applied renumbering plan.
async fn delete_and_renumber(
    conn: &mut SqliteConnection,
    invoice: &InvoiceRow,
) -> DbResult<Vec<Renumbering>> {
    // Lots shed their owner before the row disappears; their hammer
    // prices survive, so a corrected invoice can claim them back.
    sqlx::query(
        "UPDATE lots SET invoice_id = NULL, updated_at = ?2 WHERE invoice_id = ?1",
    )
    .bind(&invoice.id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM invoices WHERE id = ?1")
        .bind(&invoice.id)
        .execute(&mut *conn)
        .await?;

    let survivors: Vec<(String, i64)> =
        sqlx::query_as("SELECT id, sequence FROM invoices WHERE invoice_type = ?1")
            .bind(invoice.invoice_type)
            .fetch_all(&mut *conn)
            .await?;

    let plan = renumber_after_delete(invoice.invoice_type, &survivors, invoice.sequence);

    // Ascending old_sequence: each rewrite moves into a freed slot, so
    // the UNIQUE(invoice_type, sequence) index holds at every step.
    for renumbering in &plan {
        sqlx::query(
            "UPDATE invoices SET sequence = ?2, invoice_number = ?3, updated_at = ?4 \
             WHERE id = ?1",
        )
        .bind(&renumbering.invoice_id)
        .bind(renumbering.new_sequence)
        .bind(&renumbering.new_number)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
    }

    info!(
        invoice_number = %invoice.invoice_number,
        renumbered = plan.len(),
        "Deleted invoice and closed numbering gap"
    );

    Ok(plan)
}

/// Finds the buyer's open invoice of a type within an auction, preferring
/// the lowest sequence, or creates a fresh shell when there is none.
async fn find_or_create_for_buyer(
    conn: &mut SqliteConnection,
    auction_id: &str,
    buyer: &Buyer,
    invoice_type: InvoiceType,
) -> DbResult<String> {
    let existing: Option<String> = sqlx::query_scalar(
        "SELECT id FROM invoices \
         WHERE auction_id = ?1 AND buyer_id = ?2 AND invoice_type = ?3 \
         ORDER BY sequence LIMIT 1",
    )
    .bind(auction_id)
    .bind(&buyer.id)
    .bind(invoice_type)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let sequence = next_sequence(&mut *conn, invoice_type).await?;
    insert_shell(
        conn,
        auction_id,
        invoice_type,
        sequence,
        buyer,
        &Charges::default(),
        GstType::default(),
        Utc::now(),
    )
    .await
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Gets an invoice (with its lots) by ID.
    pub async fn get(&self, id: &str) -> DbResult<Invoice> {
        let mut conn = self.pool.acquire().await?;
        load_invoice(&mut conn, id).await
    }

    /// Gets an invoice by its business number, e.g. `INV-0007`.
    pub async fn get_by_number(&self, invoice_number: &str) -> DbResult<Invoice> {
        let mut conn = self.pool.acquire().await?;

        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM invoices WHERE invoice_number = ?1")
                .bind(invoice_number)
                .fetch_optional(&mut *conn)
                .await?;

        match id {
            Some(id) => load_invoice(&mut conn, &id).await,
            None => Err(DbError::not_found("Invoice", invoice_number)),
        }
    }

    /// Lists an auction's invoices in `(type, sequence)` order.
    pub async fn list_for_auction(&self, auction_id: &str) -> DbResult<Vec<Invoice>> {
        let mut conn = self.pool.acquire().await?;

        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM invoices WHERE auction_id = ?1 ORDER BY invoice_type, sequence",
        )
        .bind(auction_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut invoices = Vec::with_capacity(ids.len());
        for id in ids {
            invoices.push(load_invoice(&mut conn, &id).await?);
        }

        Ok(invoices)
    }

    /// Creates an invoice from won lots.
    ///
    /// ## What This Does
    /// 1. Validates the request (non-empty selection, sane charges)
    /// 2. Freezes the buyer's details onto a new invoice row at the next
    ///    sequence for the type
    /// 3. Claims each selected lot (unowned, positive hammer price)
    /// 4. Computes and persists the GST split and payable amounts
    ///
    /// All in one transaction: a single bad lot aborts the whole create.
    pub async fn create(&self, new: NewInvoice) -> DbResult<Invoice> {
        if new.lot_numbers.is_empty() {
            return Err(ValidationError::EmptyLotSelection.into());
        }
        if let Some(packing) = &new.charges.packing {
            validate_charge(packing)?;
        }
        if let Some(insurance) = &new.charges.insurance {
            validate_insurance(insurance)?;
        }

        let mut tx = self.pool.begin().await?;

        let buyer = fetch_buyer(&mut tx, &new.auction_id, &new.buyer).await?;
        let sequence = next_sequence(&mut tx, new.invoice_type).await?;
        let invoice_date = new.invoice_date.unwrap_or_else(Utc::now);
        let id = insert_shell(
            &mut tx,
            &new.auction_id,
            new.invoice_type,
            sequence,
            &buyer,
            &new.charges,
            new.gst_type,
            invoice_date,
        )
        .await?;

        for lot_number in &new.lot_numbers {
            claim_lot(&mut tx, &new.auction_id, *lot_number, &id).await?;
        }

        recompute_totals(&mut tx, &id).await?;
        let invoice = load_invoice(&mut tx, &id).await?;

        tx.commit().await?;

        info!(
            invoice_number = %invoice.invoice_number,
            lots = invoice.lots.len(),
            total_payable = %invoice.amounts.total_payable,
            "Created invoice"
        );

        Ok(invoice)
    }

    /// Applies a partial update and recomputes the totals.
    ///
    /// Removed lots are released back to the unsold pool; an update that
    /// would leave the invoice empty is rejected before any write.
    pub async fn update(&self, id: &str, patch: InvoicePatch) -> DbResult<Invoice> {
        if let Some(Some(packing)) = &patch.packing_charges {
            validate_charge(packing)?;
        }
        if let Some(Some(insurance)) = &patch.insurance_charges {
            validate_insurance(insurance)?;
        }

        let mut tx = self.pool.begin().await?;

        let row = fetch_invoice_row(&mut tx, id).await?;
        let lots = fetch_lots(&mut tx, id).await?;

        if let Some(remove) = &patch.remove_lots {
            if remove.is_empty() {
                return Err(ValidationError::EmptyLotSelection.into());
            }
            let owned: Vec<i64> = lots.iter().map(|l| l.lot_number).collect();
            for lot_number in remove {
                if !owned.contains(lot_number) {
                    return Err(ValidationError::LotNotOnInvoice {
                        invoice_id: id.to_string(),
                        lot_number: *lot_number,
                    }
                    .into());
                }
            }
            if remove.len() >= owned.len() {
                return Err(ValidationError::WouldEmptyInvoice {
                    invoice_id: id.to_string(),
                }
                .into());
            }
            for lot_number in remove {
                release_lot(&mut tx, id, *lot_number).await?;
            }
        }

        // Merge the patch over the current row.
        let invoice_date = patch.invoice_date.unwrap_or(row.invoice_date);
        let billing_json = match &patch.billing_address {
            Some(Some(address)) => Some(serde_json::to_string(address)?),
            Some(None) => None,
            None => row.billing_address.clone(),
        };
        let shipping_json = match &patch.shipping_address {
            Some(Some(address)) => Some(serde_json::to_string(address)?),
            Some(None) => None,
            None => row.shipping_address.clone(),
        };
        let packing = match patch.packing_charges {
            Some(replacement) => replacement,
            None => row.packing(),
        };
        let insurance = match patch.insurance_charges {
            Some(replacement) => replacement,
            None => row.insurance(),
        };
        let gst_type = patch.gst_type.unwrap_or(row.gst_type);
        let status = patch.status.unwrap_or(row.status);
        let sent_to_customer = patch.sent_to_customer.unwrap_or(row.sent_to_customer);

        sqlx::query(
            r#"
            UPDATE invoices SET
                invoice_date = ?2,
                billing_address = ?3,
                shipping_address = ?4,
                packing_amount_paise = ?5,
                packing_gst_bps = ?6,
                insurance_amount_paise = ?7,
                insurance_gst_bps = ?8,
                insurance_declined = ?9,
                gst_type = ?10,
                status = ?11,
                sent_to_customer = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(invoice_date)
        .bind(&billing_json)
        .bind(&shipping_json)
        .bind(packing.map(|c| c.amount.paise()))
        .bind(packing.map(|c| c.gst_rate.bps()))
        .bind(insurance.map(|c| c.amount.paise()))
        .bind(insurance.map(|c| c.gst_rate.bps()))
        .bind(insurance.map(|c| c.declined).unwrap_or(false))
        .bind(gst_type)
        .bind(status)
        .bind(sent_to_customer)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        recompute_totals(&mut tx, id).await?;
        let invoice = load_invoice(&mut tx, id).await?;

        tx.commit().await?;

        debug!(invoice_number = %invoice.invoice_number, "Updated invoice");
        Ok(invoice)
    }

    /// Deletes an invoice, releasing its lots and closing the numbering
    /// gap for its type. Returns the renumbering that was applied.
    pub async fn delete(&self, id: &str) -> DbResult<Vec<Renumbering>> {
        let mut tx = self.pool.begin().await?;

        let row = fetch_invoice_row(&mut tx, id).await?;
        let plan = delete_and_renumber(&mut tx, &row).await?;

        tx.commit().await?;
        Ok(plan)
    }

    /// Splits the selected lots off onto a new invoice for the same buyer.
    ///
    /// The selection must be a strict subset: a split that would empty
    /// the source is rejected (that case is a transfer or a delete). The
    /// new invoice takes the next sequence for the type and carries no
    /// charges of its own.
    pub async fn split(&self, id: &str, lot_numbers: &[i64]) -> DbResult<SplitOutcome> {
        let mut tx = self.pool.begin().await?;

        let row = fetch_invoice_row(&mut tx, id).await?;
        let lots = fetch_lots(&mut tx, id).await?;
        let owned: Vec<i64> = lots.iter().map(|l| l.lot_number).collect();

        validate_split_selection(id, &owned, lot_numbers)?;

        let buyer = fetch_buyer(&mut tx, &row.auction_id, &row.buyer_id).await?;
        let sequence = next_sequence(&mut tx, row.invoice_type).await?;
        let created_id = insert_shell(
            &mut tx,
            &row.auction_id,
            row.invoice_type,
            sequence,
            &buyer,
            &Charges::default(),
            row.gst_type,
            Utc::now(),
        )
        .await?;

        for lot_number in lot_numbers {
            move_lot(&mut tx, id, *lot_number, &created_id).await?;
        }

        recompute_totals(&mut tx, id).await?;
        recompute_totals(&mut tx, &created_id).await?;

        let original = load_invoice(&mut tx, id).await?;
        let created = load_invoice(&mut tx, &created_id).await?;

        tx.commit().await?;

        info!(
            from = %original.invoice_number,
            to = %created.invoice_number,
            lots = lot_numbers.len(),
            "Split invoice"
        );

        Ok(SplitOutcome { original, created })
    }

    /// Transfers lots from one buyer's customer invoice to another's.
    ///
    /// The target invoice is found or created on demand. Transferring
    /// every lot empties the source, which is then deleted and its
    /// numbering gap closed - the returned outcome carries `from: None`
    /// and the applied renumbering in that case.
    pub async fn transfer(
        &self,
        auction_id: &str,
        from_buyer: &str,
        to_buyer: &str,
        lot_numbers: &[i64],
    ) -> DbResult<TransferOutcome> {
        validate_distinct_buyers(from_buyer, to_buyer)?;
        if lot_numbers.is_empty() {
            return Err(ValidationError::EmptyLotSelection.into());
        }

        let mut tx = self.pool.begin().await?;

        let source_buyer = fetch_buyer(&mut tx, auction_id, from_buyer).await?;
        let target_buyer = fetch_buyer(&mut tx, auction_id, to_buyer).await?;

        // The source is the buyer's customer invoice owning the selection.
        let candidates: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM invoices \
             WHERE auction_id = ?1 AND buyer_id = ?2 AND invoice_type = ?3 \
             ORDER BY sequence",
        )
        .bind(auction_id)
        .bind(&source_buyer.id)
        .bind(InvoiceType::Customer)
        .fetch_all(&mut *tx)
        .await?;

        let Some(first) = candidates.first().cloned() else {
            return Err(DbError::not_found("Invoice (customer)", from_buyer));
        };

        let mut source_id = None;
        for candidate in &candidates {
            let owned: Vec<i64> = fetch_lots(&mut tx, candidate)
                .await?
                .iter()
                .map(|l| l.lot_number)
                .collect();
            if lot_numbers.iter().all(|n| owned.contains(n)) {
                source_id = Some(candidate.clone());
                break;
            }
        }
        // No candidate owns the whole selection; report against the
        // buyer's first invoice for a concrete error.
        let source_id = match source_id {
            Some(id) => id,
            None => {
                let owned: Vec<i64> = fetch_lots(&mut tx, &first)
                    .await?
                    .iter()
                    .map(|l| l.lot_number)
                    .collect();
                validate_transfer_selection(&first, &owned, lot_numbers)?;
                first
            }
        };

        let target_id =
            find_or_create_for_buyer(&mut tx, auction_id, &target_buyer, InvoiceType::Customer)
                .await?;

        for lot_number in lot_numbers {
            move_lot(&mut tx, &source_id, *lot_number, &target_id).await?;
        }

        let remaining = fetch_lots(&mut tx, &source_id).await?;
        let (from, renumbered) = if remaining.is_empty() {
            let source_row = fetch_invoice_row(&mut tx, &source_id).await?;
            let plan = delete_and_renumber(&mut tx, &source_row).await?;
            (None, plan)
        } else {
            recompute_totals(&mut tx, &source_id).await?;
            (Some(load_invoice(&mut tx, &source_id).await?), Vec::new())
        };

        recompute_totals(&mut tx, &target_id).await?;
        let to = load_invoice(&mut tx, &target_id).await?;

        tx.commit().await?;

        info!(
            to = %to.invoice_number,
            lots = lot_numbers.len(),
            source_deleted = from.is_none(),
            "Transferred lots"
        );

        Ok(TransferOutcome {
            from,
            to,
            renumbered,
        })
    }

    /// Assigns unsold lots to a buyer at operator-supplied prices, on the
    /// buyer's after-sale (ASI) invoice.
    ///
    /// Each price becomes the lot's hammer price; every selected lot must
    /// currently be unowned. The ASI invoice is found or created on
    /// demand.
    pub async fn assign_unsold(
        &self,
        auction_id: &str,
        buyer_id: &str,
        prices: &BTreeMap<i64, Money>,
    ) -> DbResult<Invoice> {
        validate_assignment_prices(prices)?;

        let mut tx = self.pool.begin().await?;

        let buyer = fetch_buyer(&mut tx, auction_id, buyer_id).await?;
        let invoice_id =
            find_or_create_for_buyer(&mut tx, auction_id, &buyer, InvoiceType::Asi).await?;

        for (lot_number, price) in prices {
            let result = sqlx::query(
                r#"
                UPDATE lots SET
                    hammer_price_paise = ?3,
                    invoice_id = ?4,
                    updated_at = ?5
                WHERE auction_id = ?1 AND lot_number = ?2 AND invoice_id IS NULL
                "#,
            )
            .bind(auction_id)
            .bind(lot_number)
            .bind(price.paise())
            .bind(&invoice_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let owner: Option<Option<String>> = sqlx::query_scalar(
                    "SELECT invoice_id FROM lots WHERE auction_id = ?1 AND lot_number = ?2",
                )
                .bind(auction_id)
                .bind(lot_number)
                .fetch_optional(&mut *tx)
                .await?;

                return match owner {
                    Some(Some(owner)) => Err(DbError::conflict(format!(
                        "Lot {lot_number} is already on invoice {owner}"
                    ))),
                    _ => Err(DbError::not_found("Lot", lot_number.to_string())),
                };
            }
        }

        recompute_totals(&mut tx, &invoice_id).await?;
        let invoice = load_invoice(&mut tx, &invoice_id).await?;

        tx.commit().await?;

        info!(
            invoice_number = %invoice.invoice_number,
            lots = prices.len(),
            "Assigned unsold lots"
        );

        Ok(invoice)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
