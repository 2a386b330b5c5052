//! Tax Compliance Service: statutory GST return generation and reconciliation

pub mod gstr;

pub use gstr::{
    classify_sales_record, Gstr1Category, Gstr1Data, Gstr1Invoice, Gstr3bData, GstReconciliation,
    TaxComplianceService,
};
