//! Integration tests for bookkeeping-core

use bigdecimal::BigDecimal;
use bookkeeping_core::{
    AccountGroup, AdvanceRequest, BalanceService, BillItem, BooksError, LedgerAccount,
    MemoryPoster, MemoryStore, PaymentMode, PaymentStatus, PosterAccounts, PurchaseBill,
    PurchaseService, RecordStore, SalesRecord, SalesRecordType, TaxComplianceService,
    SCHEMA_VERSION,
};
use chrono::NaiveDate;

const BIZ: &str = "biz1";

fn poster_accounts() -> PosterAccounts {
    PosterAccounts {
        cash: "cash".to_string(),
        sales: "sales".to_string(),
        purchases: "purchases".to_string(),
        customer_receivable: "receivable".to_string(),
        supplier_payable: "payable".to_string(),
        advance_to_supplier: "advance_asset".to_string(),
    }
}

async fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for (id, group) in [
        ("cash", AccountGroup::Asset),
        ("sales", AccountGroup::Income),
        ("purchases", AccountGroup::Expense),
        ("receivable", AccountGroup::Asset),
        ("payable", AccountGroup::Liability),
        ("advance_asset", AccountGroup::Asset),
    ] {
        store
            .save_account(&LedgerAccount::new(
                id.to_string(),
                BIZ.to_string(),
                id.to_string(),
                group,
            ))
            .await
            .unwrap();
    }
    store
}

fn purchase_bill(id: &str, date: NaiveDate, total: i64) -> PurchaseBill {
    let sub_total = total * 100 / 118;
    let gst_half = (total - sub_total) / 2;
    PurchaseBill {
        id: id.to_string(),
        business_id: BIZ.to_string(),
        supplier_id: "sup1".to_string(),
        supplier_name: "Acme Traders".to_string(),
        supplier_gstin: Some("29ABCDE1234F1Z5".to_string()),
        date,
        sub_total: BigDecimal::from(sub_total),
        cgst: BigDecimal::from(gst_half),
        sgst: BigDecimal::from(total - sub_total - gst_half),
        igst: BigDecimal::from(0),
        total_amount: BigDecimal::from(total),
        pending_amount: BigDecimal::from(total),
        status: PaymentStatus::Unpaid,
        due_date: None,
        items: vec![BillItem {
            name: "Widgets".to_string(),
            quantity: BigDecimal::from(10),
            purchase_rate: BigDecimal::from(sub_total) / BigDecimal::from(10),
            cgst: BigDecimal::from(gst_half),
            sgst: BigDecimal::from(total - sub_total - gst_half),
            igst: BigDecimal::from(0),
        }],
        version: SCHEMA_VERSION,
    }
}

fn sales_record(id: &str, date: NaiveDate, taxable: i64, cgst: i64, sgst: i64) -> SalesRecord {
    SalesRecord {
        id: id.to_string(),
        business_id: BIZ.to_string(),
        invoice_number: format!("INV-{id}"),
        date,
        record_type: SalesRecordType::Sale,
        customer_name: "Walk-in".to_string(),
        customer_gstin: None,
        is_inter_state: false,
        taxable_value: BigDecimal::from(taxable),
        cgst: BigDecimal::from(cgst),
        sgst: BigDecimal::from(sgst),
        igst: BigDecimal::from(0),
        total_amount: BigDecimal::from(taxable + cgst + sgst),
        reversed: false,
        version: SCHEMA_VERSION,
    }
}

#[tokio::test]
async fn purchase_to_trial_balance_workflow() {
    let store = seeded_store().await;
    let poster = MemoryPoster::new(store.clone(), poster_accounts());
    let mut purchases = PurchaseService::new(store.clone(), poster);
    let balances = BalanceService::new(store.clone());

    let bill_date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    purchases
        .post_purchase_bill(&purchase_bill("BILL-1", bill_date, 1180))
        .await
        .unwrap();

    purchases
        .record_advance_to_supplier(AdvanceRequest {
            business_id: BIZ.to_string(),
            supplier_id: "sup1".to_string(),
            supplier_name: "Acme Traders".to_string(),
            amount: BigDecimal::from(1000),
            payment_mode: PaymentMode::BankTransfer,
            payment_date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
            reference_number: None,
            notes: None,
        })
        .await
        .unwrap();

    let applied = purchases
        .adjust_advance_on_purchase(
            "sup1",
            "BILL-1",
            &BigDecimal::from(600),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(applied, BigDecimal::from(600));

    // Every posted entry balances; the books stay in trial balance.
    let report = balances.verify_trial_balance(BIZ, None).await.unwrap();
    assert!(report.is_balanced, "difference = {}", report.difference);

    // Cached balances agree with audit-grade replay as of today.
    let today = chrono::Utc::now().date_naive();
    for ledger in ["cash", "purchases", "payable", "advance_asset"] {
        let cached = balances.calculate_balance(ledger, None).await.unwrap();
        let replayed = balances
            .calculate_balance(ledger, Some(today))
            .await
            .unwrap();
        assert_eq!(cached, replayed, "ledger {ledger}");
    }

    // Payable carries the bill less the applied advance.
    let payable = balances.calculate_balance("payable", None).await.unwrap();
    assert_eq!(payable, BigDecimal::from(1180 - 600));
    let advance_asset = balances
        .calculate_balance("advance_asset", None)
        .await
        .unwrap();
    assert_eq!(advance_asset, BigDecimal::from(400));
}

#[tokio::test]
async fn reposting_a_bill_id_is_rejected() {
    let store = seeded_store().await;
    let poster = MemoryPoster::new(store.clone(), poster_accounts());
    let mut purchases = PurchaseService::new(store.clone(), poster);

    let bill = purchase_bill("BILL-1", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 590);
    purchases.post_purchase_bill(&bill).await.unwrap();

    let err = purchases.post_purchase_bill(&bill).await.unwrap_err();
    assert!(matches!(err, BooksError::DuplicateTransaction(_)));

    // The cached balance still reflects a single posting.
    let balances = BalanceService::new(store);
    let expense = balances.calculate_balance("purchases", None).await.unwrap();
    assert_eq!(expense, BigDecimal::from(590));
}

#[tokio::test]
async fn purchase_return_uses_absolute_values() {
    let store = seeded_store().await;
    let poster = MemoryPoster::new(store.clone(), poster_accounts());
    let mut purchases = PurchaseService::new(store.clone(), poster);

    let bill = purchase_bill("BILL-1", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 1180);
    purchases.post_purchase_bill(&bill).await.unwrap();

    // Source items stored with signed negatives still produce a
    // positive-valued return.
    let returned = vec![BillItem {
        name: "Widgets".to_string(),
        quantity: BigDecimal::from(-2),
        purchase_rate: BigDecimal::from(100),
        cgst: BigDecimal::from(-18),
        sgst: BigDecimal::from(-18),
        igst: BigDecimal::from(0),
    }];
    let return_id = purchases
        .process_purchase_return("BILL-1", &returned, Some("damaged on arrival"))
        .await
        .unwrap();

    let txn = store.get_transaction(&return_id).await.unwrap().unwrap();
    assert_eq!(txn.sub_total, BigDecimal::from(200));
    assert_eq!(txn.tax_amount, BigDecimal::from(36));
    assert_eq!(txn.total_amount, BigDecimal::from(236));
}

#[tokio::test]
async fn purchase_return_requires_the_original_bill() {
    let store = seeded_store().await;
    let poster = MemoryPoster::new(store.clone(), poster_accounts());
    let mut purchases = PurchaseService::new(store.clone(), poster);

    let err = purchases
        .process_purchase_return("GHOST", &[], None)
        .await
        .unwrap_err();
    assert!(matches!(err, BooksError::NotFound(_)));
}

#[tokio::test]
async fn advance_projections_track_the_lifecycle() {
    let store = seeded_store().await;
    let poster = MemoryPoster::new(store.clone(), poster_accounts());
    let mut purchases = PurchaseService::new(store.clone(), poster);

    purchases
        .record_advance_to_supplier(AdvanceRequest {
            business_id: BIZ.to_string(),
            supplier_id: "sup1".to_string(),
            supplier_name: "Acme Traders".to_string(),
            amount: BigDecimal::from(800),
            payment_mode: PaymentMode::Upi,
            payment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            reference_number: Some("UTR-001".to_string()),
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(
        purchases.get_supplier_advance_balance("sup1").await.unwrap(),
        BigDecimal::from(800)
    );
    assert_eq!(purchases.get_all_pending_advances(BIZ).await.unwrap().len(), 1);

    purchases
        .adjust_advance_on_purchase(
            "sup1",
            "BILL-1",
            &BigDecimal::from(800),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        purchases.get_supplier_advance_balance("sup1").await.unwrap(),
        BigDecimal::from(0)
    );
    assert!(purchases.get_all_pending_advances(BIZ).await.unwrap().is_empty());
    // The exhausted record is still visible when not filtering to active.
    assert_eq!(
        purchases.get_supplier_advances("sup1", false).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn gst_returns_reconcile_over_a_shared_dataset() {
    let mut store = seeded_store().await;
    let date = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
    store
        .save_sales_record(&sales_record("s1", date, 10_000, 900, 900))
        .await
        .unwrap();
    store
        .save_sales_record(&sales_record("s2", date, 4_000, 360, 360))
        .await
        .unwrap();
    store
        .save_purchase_bill(&purchase_bill("BILL-1", date, 1180))
        .await
        .unwrap();

    let tax = TaxComplianceService::new(store.clone());
    let gstr1 = tax.generate_gstr1(BIZ, 3, 2024).await.unwrap();
    assert_eq!(gstr1.invoice_count, 2);
    assert_eq!(gstr1.total_taxable_value, BigDecimal::from(14_000));

    let gstr3b = tax.generate_gstr3b(BIZ, 3, 2024).await.unwrap();
    assert_eq!(gstr3b.outward_cgst, BigDecimal::from(1_260));
    // Supplier GSTIN is 15 characters, so the bill's GST is creditable.
    assert!(gstr3b.itc_cgst > BigDecimal::from(0));

    let recon = tax.reconcile_gst(BIZ, 3, 2024).await.unwrap();
    assert!(recon.is_reconciled);
    assert_eq!(recon.gstr1_taxable_value, recon.gstr3b_taxable_value);
}

#[tokio::test]
async fn month_boundaries_scope_the_returns() {
    let mut store = seeded_store().await;
    store
        .save_sales_record(&sales_record(
            "march",
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            1_000,
            90,
            90,
        ))
        .await
        .unwrap();
    store
        .save_sales_record(&sales_record(
            "april",
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            2_000,
            180,
            180,
        ))
        .await
        .unwrap();

    let tax = TaxComplianceService::new(store);
    let march = tax.generate_gstr1(BIZ, 3, 2024).await.unwrap();
    assert_eq!(march.total_taxable_value, BigDecimal::from(1_000));
    let april = tax.generate_gstr1(BIZ, 4, 2024).await.unwrap();
    assert_eq!(april.total_taxable_value, BigDecimal::from(2_000));
}
