//! GST returns walkthrough: classify a month of sales into GSTR-1 buckets,
//! build the GSTR-3B summary, and reconcile the two.

use bigdecimal::BigDecimal;
use bookkeeping_core::{
    MemoryStore, PaymentStatus, PurchaseBill, RecordStore, SalesRecord, SalesRecordType,
    TaxComplianceService, SCHEMA_VERSION,
};
use chrono::NaiveDate;

fn sale(id: &str, taxable: i64, cgst: i64, sgst: i64, igst: i64) -> SalesRecord {
    SalesRecord {
        id: id.to_string(),
        business_id: "demo-biz".to_string(),
        invoice_number: format!("INV-{id}"),
        date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
        record_type: SalesRecordType::Sale,
        customer_name: "Walk-in".to_string(),
        customer_gstin: None,
        is_inter_state: false,
        taxable_value: BigDecimal::from(taxable),
        cgst: BigDecimal::from(cgst),
        sgst: BigDecimal::from(sgst),
        igst: BigDecimal::from(igst),
        total_amount: BigDecimal::from(taxable + cgst + sgst + igst),
        reversed: false,
        version: SCHEMA_VERSION,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Bookkeeping Core - GST Returns & Reconciliation\n");

    let mut store = MemoryStore::new();

    // A registered B2B customer, a large inter-state consumer sale, a small
    // counter sale, and a credit note.
    let mut b2b = sale("b2b", 100_000, 9_000, 9_000, 0);
    b2b.customer_gstin = Some("29AAACQ1234L1ZA".to_string());
    store.save_sales_record(&b2b).await?;

    let mut large = sale("large", 280_000, 0, 0, 50_400);
    large.is_inter_state = true;
    store.save_sales_record(&large).await?;

    store.save_sales_record(&sale("counter", 4_000, 360, 360, 0)).await?;

    let mut credit = sale("credit", -5_000, -450, -450, 0);
    credit.record_type = SalesRecordType::SaleReturn;
    store.save_sales_record(&credit).await?;

    // One creditable purchase (supplier GSTIN on file) and one without.
    let creditable = PurchaseBill {
        id: "BILL-A".to_string(),
        business_id: "demo-biz".to_string(),
        supplier_id: "sup-a".to_string(),
        supplier_name: "Acme Traders".to_string(),
        supplier_gstin: Some("29ABCDE1234F1Z5".to_string()),
        date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
        sub_total: BigDecimal::from(50_000),
        cgst: BigDecimal::from(4_500),
        sgst: BigDecimal::from(4_500),
        igst: BigDecimal::from(0),
        total_amount: BigDecimal::from(59_000),
        pending_amount: BigDecimal::from(0),
        status: PaymentStatus::Paid,
        due_date: None,
        items: Vec::new(),
        version: SCHEMA_VERSION,
    };
    store.save_purchase_bill(&creditable).await?;
    let mut cash_purchase = creditable.clone();
    cash_purchase.id = "BILL-B".to_string();
    cash_purchase.supplier_gstin = None;
    store.save_purchase_bill(&cash_purchase).await?;

    let tax = TaxComplianceService::new(store);

    let gstr1 = tax.generate_gstr1("demo-biz", 3, 2024).await?;
    println!("📤 GSTR-1 for March 2024:");
    println!("  B2B invoices:   {}", gstr1.b2b_invoices.len());
    println!("  B2C large:      {}", gstr1.b2c_large.len());
    println!("  B2C small:      {}", gstr1.b2c_small.len());
    println!("  Credit notes:   {}", gstr1.credit_notes.len());
    println!("  Taxable value:  ₹{}", gstr1.total_taxable_value);

    let gstr3b = tax.generate_gstr3b("demo-biz", 3, 2024).await?;
    println!("\n📥 GSTR-3B for March 2024:");
    println!(
        "  Outward: taxable ₹{}, CGST ₹{}, SGST ₹{}, IGST ₹{}",
        gstr3b.outward_taxable_value, gstr3b.outward_cgst, gstr3b.outward_sgst, gstr3b.outward_igst
    );
    println!(
        "  ITC (GSTIN-backed bills only): CGST ₹{}, SGST ₹{}",
        gstr3b.itc_cgst, gstr3b.itc_sgst
    );
    println!("  Net payable: ₹{}", gstr3b.total_payable);

    let recon = tax.reconcile_gst("demo-biz", 3, 2024).await?;
    println!(
        "\n🔍 Reconciliation: taxable diff ₹{}, reconciled: {}",
        recon.taxable_value_difference, recon.is_reconciled
    );

    Ok(())
}
