//! Supplier advance lifecycle walkthrough: record advances, allocate them
//! FIFO against a purchase bill, and watch the ledger stay balanced.

use bigdecimal::BigDecimal;
use bookkeeping_core::{
    AccountGroup, AdvanceRequest, BalanceService, BillItem, LedgerAccount, MemoryPoster,
    MemoryStore, PaymentMode, PaymentStatus, PosterAccounts, PurchaseBill, PurchaseService,
    RecordStore, SCHEMA_VERSION,
};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Bookkeeping Core - Supplier Advance Allocation\n");

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
                "demo-biz".to_string(),
                id.to_string(),
                group,
            ))
            .await?;
        println!("  ✓ Created ledger: {id}");
    }

    let poster = MemoryPoster::new(
        store.clone(),
        PosterAccounts {
            cash: "cash".to_string(),
            sales: "sales".to_string(),
            purchases: "purchases".to_string(),
            customer_receivable: "receivable".to_string(),
            supplier_payable: "payable".to_string(),
            advance_to_supplier: "advance_asset".to_string(),
        },
    );
    let mut purchases = PurchaseService::new(store.clone(), poster);
    let balances = BalanceService::new(store.clone());

    // Two advances to the same supplier, a few days apart.
    println!("\n💰 Recording advances to Acme Traders...");
    for (amount, day) in [(300, 1), (500, 5)] {
        let advance = purchases
            .record_advance_to_supplier(AdvanceRequest {
                business_id: "demo-biz".to_string(),
                supplier_id: "sup-acme".to_string(),
                supplier_name: "Acme Traders".to_string(),
                amount: BigDecimal::from(amount),
                payment_mode: PaymentMode::BankTransfer,
                payment_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                reference_number: None,
                notes: None,
            })
            .await?;
        println!("  ✓ Advance {} of ₹{amount}", advance.advance_id);
    }

    // A new purchase bill arrives.
    let bill = PurchaseBill {
        id: "BILL-700".to_string(),
        business_id: "demo-biz".to_string(),
        supplier_id: "sup-acme".to_string(),
        supplier_name: "Acme Traders".to_string(),
        supplier_gstin: Some("29ABCDE1234F1Z5".to_string()),
        date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        sub_total: BigDecimal::from(700),
        cgst: BigDecimal::from(0),
        sgst: BigDecimal::from(0),
        igst: BigDecimal::from(0),
        total_amount: BigDecimal::from(700),
        pending_amount: BigDecimal::from(700),
        status: PaymentStatus::Unpaid,
        due_date: None,
        items: vec![BillItem {
            name: "Raw material".to_string(),
            quantity: BigDecimal::from(7),
            purchase_rate: BigDecimal::from(100),
            cgst: BigDecimal::from(0),
            sgst: BigDecimal::from(0),
            igst: BigDecimal::from(0),
        }],
        version: SCHEMA_VERSION,
    };
    purchases.post_purchase_bill(&bill).await?;
    println!("\n📄 Posted purchase bill BILL-700 for ₹700");

    // FIFO allocation: the Jan 1 advance drains first.
    let applied = purchases
        .adjust_advance_on_purchase(
            "sup-acme",
            "BILL-700",
            &BigDecimal::from(700),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        )
        .await?;
    println!("  ✓ Applied ₹{applied} of advances against the bill");

    for advance in purchases.get_supplier_advances("sup-acme", false).await? {
        println!(
            "  • {}: used ₹{}, remaining ₹{} ({:?})",
            advance.advance_id, advance.used_amount, advance.remaining_amount, advance.status
        );
    }

    let report = balances.verify_trial_balance("demo-biz", None).await?;
    println!(
        "\n⚖️  Trial balance: debit ₹{} / credit ₹{} — balanced: {}",
        report.total_debit, report.total_credit, report.is_balanced
    );

    Ok(())
}
