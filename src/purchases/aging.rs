//! Supplier aging report over outstanding purchase bills

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::purchases::service::PurchaseService;
use crate::traits::{RecordStore, TransactionPoster};
use crate::types::*;

/// Outstanding purchase amounts bucketed by days outstanding.
/// Upper edges are inclusive: 0-30, 31-60, 61-90, over 90.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierAgingReport {
    pub business_id: String,
    pub as_of: NaiveDate,
    pub current: BigDecimal,
    pub days_31_to_60: BigDecimal,
    pub days_61_to_90: BigDecimal,
    pub over_90: BigDecimal,
    pub total: BigDecimal,
    pub bill_count: usize,
}

impl<S: RecordStore, P: TransactionPoster> PurchaseService<S, P> {
    /// Bucket every outstanding (Unpaid/Partial) bill's pending amount by
    /// `as_of - bill.date` in days.
    pub async fn supplier_aging(
        &self,
        business_id: &str,
        as_of: NaiveDate,
    ) -> BooksResult<SupplierAgingReport> {
        let bills = self.store.outstanding_purchase_bills(business_id).await?;

        let mut report = SupplierAgingReport {
            business_id: business_id.to_string(),
            as_of,
            current: BigDecimal::from(0),
            days_31_to_60: BigDecimal::from(0),
            days_61_to_90: BigDecimal::from(0),
            over_90: BigDecimal::from(0),
            total: BigDecimal::from(0),
            bill_count: bills.len(),
        };

        for bill in &bills {
            let days_outstanding = (as_of - bill.date).num_days();
            let bucket = match days_outstanding {
                d if d <= 30 => &mut report.current,
                d if d <= 60 => &mut report.days_31_to_60,
                d if d <= 90 => &mut report.days_61_to_90,
                _ => &mut report.over_90,
            };
            *bucket += &bill.pending_amount;
            report.total += &bill.pending_amount;
        }

        Ok(report)
    }
}
