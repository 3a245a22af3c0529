//! End-to-end settlement flow over a real (in-memory) database.
//!
//! Walks one auction through the whole back-office day: invoicing won
//! lots, splitting, transferring between buyers, deleting with
//! renumbering, assigning unsold lots after the close, and rendering
//! the display-only commission block alongside the stored totals.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use hammer_core::commission::{commission_figures, commission_rate_for};
use hammer_core::words::amount_in_words;
use hammer_core::{
    Charge, Charges, GstRate, GstType, InvoiceType, Money, NewInvoice, Settings,
};
use hammer_db::{Database, DbConfig, NewBuyer, NewLot};

struct Auction {
    db: Database,
    id: String,
}

async fn seeded_auction() -> Auction {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let auction = db.auctions().create("Spring Sale", None).await.unwrap();
    Auction {
        db,
        id: auction.id,
    }
}

impl Auction {
    async fn buyer(&self, paddle: i64) -> hammer_core::Buyer {
        self.db
            .buyers()
            .create(NewBuyer {
                auction_id: self.id.clone(),
                paddle_number: paddle,
                name: format!("Paddle {paddle}"),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    async fn hammered_lot(&self, number: i64, rupees: i64, gst_bps: u32) {
        self.db
            .lots()
            .create(NewLot {
                auction_id: self.id.clone(),
                lot_number: number,
                description: format!("Lot {number}"),
                gst_rate: GstRate::from_bps(gst_bps),
                ..Default::default()
            })
            .await
            .unwrap();
        self.db
            .lots()
            .set_hammer_price(&self.id, number, Money::from_rupees(rupees))
            .await
            .unwrap();
    }

    async fn unsold_lot(&self, number: i64, gst_bps: u32) {
        self.db
            .lots()
            .create(NewLot {
                auction_id: self.id.clone(),
                lot_number: number,
                description: format!("Lot {number}"),
                gst_rate: GstRate::from_bps(gst_bps),
                ..Default::default()
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn settlement_day_end_to_end() {
    let auction = seeded_auction().await;
    let alice = auction.buyer(101).await;
    let bob = auction.buyer(102).await;

    // Won on the floor: four lots for Alice, one for Bob.
    for (number, rupees) in [(10, 1000), (11, 2000), (12, 500), (13, 750)] {
        auction.hammered_lot(number, rupees, 500).await;
    }
    auction.hammered_lot(20, 3000, 500).await;
    // Passed on the floor, assigned after the close.
    auction.unsold_lot(30, 500).await;
    auction.unsold_lot(31, 500).await;

    // ---- create -----------------------------------------------------------
    let alice_invoice = auction
        .db
        .invoices()
        .create(NewInvoice {
            auction_id: auction.id.clone(),
            invoice_type: InvoiceType::Customer,
            buyer: alice.id.clone(),
            lot_numbers: vec![10, 11, 12, 13],
            charges: Charges {
                packing: Some(Charge {
                    amount: Money::from_rupees(80),
                    gst_rate: GstRate::from_bps(1800),
                }),
                insurance: None,
            },
            gst_type: GstType::CgstSgst,
            invoice_date: None,
        })
        .await
        .unwrap();
    let bob_invoice = auction
        .db
        .invoices()
        .create(NewInvoice {
            auction_id: auction.id.clone(),
            invoice_type: InvoiceType::Customer,
            buyer: bob.id.clone(),
            lot_numbers: vec![20],
            charges: Charges::default(),
            gst_type: GstType::CgstSgst,
            invoice_date: None,
        })
        .await
        .unwrap();

    assert_eq!(alice_invoice.invoice_number, "INV-0001");
    assert_eq!(bob_invoice.invoice_number, "INV-0002");
    // ₹4250 in lots + ₹80 packing, all inclusive figures whole rupees
    assert_eq!(
        alice_invoice.amounts.total_payable,
        Money::from_rupees(4330)
    );

    // ---- split ------------------------------------------------------------
    let split = auction
        .db
        .invoices()
        .split(&alice_invoice.id, &[12, 13])
        .await
        .unwrap();
    assert_eq!(split.original.lot_numbers(), vec![10, 11]);
    assert_eq!(split.created.lot_numbers(), vec![12, 13]);
    assert_eq!(split.created.invoice_number, "INV-0003");
    // Charges stayed with the source
    assert!(split.created.packing_charges.is_none());
    assert_eq!(
        split.original.amounts.total_payable,
        Money::from_rupees(3080)
    );
    assert_eq!(
        split.created.amounts.total_payable,
        Money::from_rupees(1250)
    );

    // ---- transfer (partial) ----------------------------------------------
    let transfer = auction
        .db
        .invoices()
        .transfer(&auction.id, &alice.id, &bob.id, &[11])
        .await
        .unwrap();
    let alice_after = transfer.from.unwrap();
    assert_eq!(alice_after.lot_numbers(), vec![10]);
    assert_eq!(transfer.to.lot_numbers(), vec![11, 20]);
    assert_eq!(
        transfer.to.amounts.total_payable,
        Money::from_rupees(5000)
    );
    assert!(transfer.renumbered.is_empty());

    // ---- transfer (emptying) deletes the source and renumbers ------------
    let emptied = auction
        .db
        .invoices()
        .transfer(&auction.id, &alice.id, &bob.id, &[10])
        .await
        .unwrap();
    assert!(emptied.from.is_none());
    // INV-0001 vanished: INV-0002 → INV-0001, INV-0003 → INV-0002
    assert_eq!(emptied.renumbered.len(), 2);
    assert_eq!(emptied.to.invoice_number, "INV-0001");
    assert_eq!(emptied.to.lot_numbers(), vec![10, 11, 20]);

    let renumbered_split = auction
        .db
        .invoices()
        .get(&split.created.id)
        .await
        .unwrap();
    assert_eq!(renumbered_split.invoice_number, "INV-0002");
    assert_eq!(renumbered_split.lot_numbers(), vec![12, 13]);

    // ---- unsold assignment ------------------------------------------------
    let mut prices = BTreeMap::new();
    prices.insert(30, Money::from_rupees(600));
    prices.insert(31, Money::from_rupees(400));
    let asi = auction
        .db
        .invoices()
        .assign_unsold(&auction.id, &alice.id, &prices)
        .await
        .unwrap();
    assert_eq!(asi.invoice_type, InvoiceType::Asi);
    assert_eq!(asi.invoice_number, "ASI-0001");
    assert_eq!(asi.amounts.total_payable, Money::from_rupees(1000));
    assert!(auction.db.lots().unsold(&auction.id).await.unwrap().is_empty());

    // ---- commission block (display-only) ----------------------------------
    let settings = Settings {
        global_commission_rate: GstRate::from_bps(1500),
        commission_cutoff_date: NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
    };
    auction.db.settings().save(&settings).await.unwrap();
    let loaded = auction.db.settings().load().await.unwrap();
    assert_eq!(loaded, settings);

    let bobs = auction.db.invoices().get(&emptied.to.id).await.unwrap();
    let hammer_total: Money = bobs.lots.iter().map(|l| l.hammer()).sum();
    let rate = commission_rate_for(bobs.invoice_date, &loaded, bobs.buyer_details.commission_rate);
    let figures = commission_figures(hammer_total, rate);

    // 15% of ₹6000 plus 9% + 9% GST on it - shown, never collected
    assert_eq!(figures.amount, Money::from_rupees(900));
    assert_eq!(figures.total(), Money::from_paise(106_200));
    assert_eq!(bobs.amounts.total_payable, Money::from_rupees(6000));

    // ---- amount in words ---------------------------------------------------
    assert_eq!(
        amount_in_words(bobs.amounts.total_payable),
        "Six Thousand Rupees Only"
    );
}

#[tokio::test]
async fn failed_operations_leave_no_trace() {
    let auction = seeded_auction().await;
    let alice = auction.buyer(101).await;
    auction.hammered_lot(10, 1000, 500).await;
    auction.unsold_lot(11, 500).await;

    // Create with one bad lot: nothing persisted at all.
    let err = auction
        .db
        .invoices()
        .create(NewInvoice {
            auction_id: auction.id.clone(),
            invoice_type: InvoiceType::Customer,
            buyer: alice.id.clone(),
            lot_numbers: vec![10, 11],
            charges: Charges::default(),
            gst_type: GstType::CgstSgst,
            invoice_date: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, hammer_db::DbError::Validation(_)));

    assert!(auction
        .db
        .invoices()
        .list_for_auction(&auction.id)
        .await
        .unwrap()
        .is_empty());
    let lot = auction.db.lots().get_by_number(&auction.id, 10).await.unwrap();
    assert!(lot.invoice_id.is_none());

    // Rejected unsold assignment changes neither lots nor invoices.
    let mut prices = BTreeMap::new();
    prices.insert(11, Money::zero());
    assert!(auction
        .db
        .invoices()
        .assign_unsold(&auction.id, &alice.id, &prices)
        .await
        .is_err());
    assert_eq!(auction.db.lots().unsold(&auction.id).await.unwrap().len(), 1);
}
