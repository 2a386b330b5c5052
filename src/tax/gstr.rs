//! GSTR-1 and GSTR-3B generation and cross-reconciliation
//!
//! GSTR-1 categorizes raw sales documents into statutory invoice buckets;
//! GSTR-3B aggregates outward tax and input tax credit into a summary
//! liability. The two are computed from the records independently so that
//! reconciling them is a meaningful cross-check.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::traits::RecordStore;
use crate::types::*;
use crate::utils::validation::{is_classifiable_gstin, month_bounds};

/// Invoice value above which an unregistered inter-state sale is reported
/// as B2C Large.
fn b2c_large_threshold() -> BigDecimal {
    BigDecimal::from(250_000)
}

/// Statutory invoice categories, mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gstr1Category {
    B2b,
    B2cLarge,
    B2cSmall,
    CreditNote,
    Export,
}

/// One classified invoice inside a GSTR-1 return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gstr1Invoice {
    pub record_id: String,
    pub invoice_number: String,
    pub date: chrono::NaiveDate,
    pub customer_name: String,
    pub customer_gstin: Option<String>,
    pub is_inter_state: bool,
    pub taxable_value: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
    pub total_amount: BigDecimal,
}

/// Outward-supply return for one (business, month, year).
/// Derived and read-only; recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gstr1Data {
    pub business_id: String,
    pub month: u32,
    pub year: i32,
    pub b2b_invoices: Vec<Gstr1Invoice>,
    pub b2c_large: Vec<Gstr1Invoice>,
    pub b2c_small: Vec<Gstr1Invoice>,
    pub credit_notes: Vec<Gstr1Invoice>,
    pub export_invoices: Vec<Gstr1Invoice>,
    /// Totals cover B2B + B2C Large + B2C Small only.
    pub total_taxable_value: BigDecimal,
    pub total_cgst: BigDecimal,
    pub total_sgst: BigDecimal,
    pub total_igst: BigDecimal,
    pub invoice_count: usize,
}

/// Summary return: outward liability, input tax credit, net payable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gstr3bData {
    pub business_id: String,
    pub month: u32,
    pub year: i32,
    pub outward_taxable_value: BigDecimal,
    pub outward_cgst: BigDecimal,
    pub outward_sgst: BigDecimal,
    pub outward_igst: BigDecimal,
    pub itc_cgst: BigDecimal,
    pub itc_sgst: BigDecimal,
    pub itc_igst: BigDecimal,
    pub net_cgst: BigDecimal,
    pub net_sgst: BigDecimal,
    pub net_igst: BigDecimal,
    pub total_payable: BigDecimal,
}

/// Pairwise comparison of the two returns. Diagnostic only: differences are
/// reported, never auto-corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstReconciliation {
    pub business_id: String,
    pub month: u32,
    pub year: i32,
    pub gstr1_taxable_value: BigDecimal,
    pub gstr3b_taxable_value: BigDecimal,
    pub taxable_value_difference: BigDecimal,
    pub gstr1_cgst: BigDecimal,
    pub gstr3b_cgst: BigDecimal,
    pub cgst_difference: BigDecimal,
    pub gstr1_sgst: BigDecimal,
    pub gstr3b_sgst: BigDecimal,
    pub sgst_difference: BigDecimal,
    pub gstr1_igst: BigDecimal,
    pub gstr3b_igst: BigDecimal,
    pub igst_difference: BigDecimal,
    pub is_reconciled: bool,
}

/// Classify one sales record into its statutory category.
///
/// Precedence is fixed: credit note, then B2B, then B2C Large, then export,
/// then B2C Small. The B2B test runs before the export test, so an export
/// sale carrying a 15-character GSTIN lands in B2B.
pub fn classify_sales_record(record: &SalesRecord) -> Gstr1Category {
    if record.record_type == SalesRecordType::SaleReturn {
        Gstr1Category::CreditNote
    } else if is_classifiable_gstin(record.customer_gstin.as_deref()) {
        Gstr1Category::B2b
    } else if record.total_amount > b2c_large_threshold() && record.is_inter_state {
        Gstr1Category::B2cLarge
    } else if record.record_type == SalesRecordType::Export {
        Gstr1Category::Export
    } else {
        Gstr1Category::B2cSmall
    }
}

fn to_invoice(record: &SalesRecord, absolute: bool) -> Gstr1Invoice {
    let pick = |v: &BigDecimal| if absolute { v.abs() } else { v.clone() };
    Gstr1Invoice {
        record_id: record.id.clone(),
        invoice_number: record.invoice_number.clone(),
        date: record.date,
        customer_name: record.customer_name.clone(),
        customer_gstin: record.customer_gstin.clone(),
        is_inter_state: record.is_inter_state,
        taxable_value: pick(&record.taxable_value),
        cgst: pick(&record.cgst),
        sgst: pick(&record.sgst),
        igst: pick(&record.igst),
        total_amount: pick(&record.total_amount),
    }
}

/// Builds statutory GST aggregates from raw sales and purchase records.
pub struct TaxComplianceService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> TaxComplianceService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Outward-supply return for a calendar month. Reversed sales are
    /// excluded before classification.
    pub async fn generate_gstr1(
        &self,
        business_id: &str,
        month: u32,
        year: i32,
    ) -> BooksResult<Gstr1Data> {
        let (start, end) = month_bounds(year, month)?;
        let records = self.store.sales_in_period(business_id, start, end).await?;

        let mut data = Gstr1Data {
            business_id: business_id.to_string(),
            month,
            year,
            b2b_invoices: Vec::new(),
            b2c_large: Vec::new(),
            b2c_small: Vec::new(),
            credit_notes: Vec::new(),
            export_invoices: Vec::new(),
            total_taxable_value: BigDecimal::from(0),
            total_cgst: BigDecimal::from(0),
            total_sgst: BigDecimal::from(0),
            total_igst: BigDecimal::from(0),
            invoice_count: 0,
        };

        for record in records.iter().filter(|r| !r.reversed) {
            match classify_sales_record(record) {
                Gstr1Category::CreditNote => {
                    data.credit_notes.push(to_invoice(record, true));
                }
                Gstr1Category::Export => {
                    data.export_invoices.push(to_invoice(record, false));
                }
                category => {
                    let invoice = to_invoice(record, false);
                    data.total_taxable_value += &invoice.taxable_value;
                    data.total_cgst += &invoice.cgst;
                    data.total_sgst += &invoice.sgst;
                    data.total_igst += &invoice.igst;
                    match category {
                        Gstr1Category::B2b => data.b2b_invoices.push(invoice),
                        Gstr1Category::B2cLarge => data.b2c_large.push(invoice),
                        _ => data.b2c_small.push(invoice),
                    }
                }
            }
        }
        data.invoice_count =
            data.b2b_invoices.len() + data.b2c_large.len() + data.b2c_small.len();

        tracing::debug!(
            business_id = %business_id,
            month,
            year,
            invoice_count = data.invoice_count,
            credit_notes = data.credit_notes.len(),
            "GSTR-1 generated"
        );
        Ok(data)
    }

    /// Summary return for a calendar month.
    ///
    /// Outward tax sums plain sales only (returns fall out of the type
    /// filter). ITC covers purchase bills whose supplier GSTIN is exactly
    /// 15 characters; purchases without one are non-creditable. Net
    /// liability per head is floored at zero: excess ITC is dropped, not
    /// carried forward.
    pub async fn generate_gstr3b(
        &self,
        business_id: &str,
        month: u32,
        year: i32,
    ) -> BooksResult<Gstr3bData> {
        let (start, end) = month_bounds(year, month)?;
        let sales = self.store.sales_in_period(business_id, start, end).await?;
        let bills = self
            .store
            .purchase_bills_in_period(business_id, start, end)
            .await?;

        let zero = BigDecimal::from(0);
        let mut outward_taxable = zero.clone();
        let mut outward_cgst = zero.clone();
        let mut outward_sgst = zero.clone();
        let mut outward_igst = zero.clone();
        for sale in sales
            .iter()
            .filter(|s| !s.reversed && s.record_type == SalesRecordType::Sale)
        {
            outward_taxable += &sale.taxable_value;
            outward_cgst += &sale.cgst;
            outward_sgst += &sale.sgst;
            outward_igst += &sale.igst;
        }

        let mut itc_cgst = zero.clone();
        let mut itc_sgst = zero.clone();
        let mut itc_igst = zero.clone();
        for bill in bills
            .iter()
            .filter(|b| is_classifiable_gstin(b.supplier_gstin.as_deref()))
        {
            itc_cgst += &bill.cgst;
            itc_sgst += &bill.sgst;
            itc_igst += &bill.igst;
        }

        let floor = |net: BigDecimal| if net < zero { zero.clone() } else { net };
        let net_cgst = floor(&outward_cgst - &itc_cgst);
        let net_sgst = floor(&outward_sgst - &itc_sgst);
        let net_igst = floor(&outward_igst - &itc_igst);
        let total_payable = &net_cgst + &net_sgst + &net_igst;

        tracing::debug!(
            business_id = %business_id,
            month,
            year,
            total_payable = %total_payable,
            "GSTR-3B generated"
        );

        Ok(Gstr3bData {
            business_id: business_id.to_string(),
            month,
            year,
            outward_taxable_value: outward_taxable,
            outward_cgst,
            outward_sgst,
            outward_igst,
            itc_cgst,
            itc_sgst,
            itc_igst,
            net_cgst,
            net_sgst,
            net_igst,
            total_payable,
        })
    }

    /// Run both generators and compare taxable value and the three tax heads
    /// pairwise. Reconciled when every absolute difference is under one
    /// currency unit.
    pub async fn reconcile_gst(
        &self,
        business_id: &str,
        month: u32,
        year: i32,
    ) -> BooksResult<GstReconciliation> {
        let (gstr1, gstr3b) = futures::try_join!(
            self.generate_gstr1(business_id, month, year),
            self.generate_gstr3b(business_id, month, year),
        )?;

        let taxable_value_difference = &gstr1.total_taxable_value - &gstr3b.outward_taxable_value;
        let cgst_difference = &gstr1.total_cgst - &gstr3b.outward_cgst;
        let sgst_difference = &gstr1.total_sgst - &gstr3b.outward_sgst;
        let igst_difference = &gstr1.total_igst - &gstr3b.outward_igst;

        let tolerance = BigDecimal::from(1);
        let is_reconciled = taxable_value_difference.abs() < tolerance
            && cgst_difference.abs() < tolerance
            && sgst_difference.abs() < tolerance
            && igst_difference.abs() < tolerance;

        if !is_reconciled {
            tracing::warn!(
                business_id = %business_id,
                month,
                year,
                taxable_diff = %taxable_value_difference,
                "GSTR-1 and GSTR-3B do not reconcile"
            );
        }

        Ok(GstReconciliation {
            business_id: business_id.to_string(),
            month,
            year,
            gstr1_taxable_value: gstr1.total_taxable_value,
            gstr3b_taxable_value: gstr3b.outward_taxable_value,
            taxable_value_difference,
            gstr1_cgst: gstr1.total_cgst,
            gstr3b_cgst: gstr3b.outward_cgst,
            cgst_difference,
            gstr1_sgst: gstr1.total_sgst,
            gstr3b_sgst: gstr3b.outward_sgst,
            sgst_difference,
            gstr1_igst: gstr1.total_igst,
            gstr3b_igst: gstr3b.outward_igst,
            igst_difference,
            is_reconciled,
        })
    }
}
