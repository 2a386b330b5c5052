//! FIFO allocation of supplier advances against new purchase obligations

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::purchases::service::PurchaseService;
use crate::traits::{RecordStore, TransactionPoster};
use crate::types::*;

/// Remaining amount at or below which an advance counts as exhausted.
fn exhaustion_threshold() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

/// One advance-to-bill application produced by the allocation walk.
#[derive(Debug, Clone)]
struct Application {
    advance: SupplierAdvance,
    applied: BigDecimal,
}

impl<S: RecordStore, P: TransactionPoster> PurchaseService<S, P> {
    /// Consume the supplier's outstanding advances against a new bill,
    /// oldest payment first.
    ///
    /// The walk applies `min(remaining_advance, remaining_bill)` per advance
    /// and stops once the bill is covered. All advance-record mutations
    /// commit as one atomic batch before any ledger posting is issued. Each
    /// reallocation posting is keyed by the advance id, the bill id, and the
    /// advance's cumulative used amount after the commit: replaying the
    /// posting loop cannot double-post an entry, while a fresh allocation
    /// against the same pair gets its own key and its own ledger entry.
    /// A posting failure after the batch commit surfaces as
    /// [`BooksError::PartialAllocation`] carrying what was applied.
    ///
    /// Returns the total applied (`<= bill_amount`; zero when the bill
    /// amount is non-positive or no open advance exists).
    pub async fn adjust_advance_on_purchase(
        &mut self,
        supplier_id: &str,
        bill_id: &str,
        bill_amount: &BigDecimal,
        bill_date: NaiveDate,
    ) -> BooksResult<BigDecimal> {
        if *bill_amount <= BigDecimal::from(0) {
            return Ok(BigDecimal::from(0));
        }

        let advances = self.store.advances_for_supplier(supplier_id, true).await?;
        let applications = plan_allocation(advances, bill_id, bill_amount);
        if applications.is_empty() {
            return Ok(BigDecimal::from(0));
        }

        let total_applied: BigDecimal = applications.iter().map(|a| &a.applied).sum();
        let updated: Vec<SupplierAdvance> =
            applications.iter().map(|a| a.advance.clone()).collect();

        // Single all-or-nothing commit for the advance mutations; the paired
        // ledger postings below are retriable by key, not part of this unit.
        self.store.update_advances_atomic(&updated).await?;

        let mut posted = BigDecimal::from(0);
        let business_id = applications[0].advance.business_id.clone();
        for application in &applications {
            let reference = format!(
                "{}:{}:{}",
                application.advance.advance_id, bill_id, application.advance.used_amount
            );
            let result = self
                .poster
                .adjust_advance_to_payable(
                    &business_id,
                    supplier_id,
                    &application.applied,
                    &reference,
                    bill_date,
                    Some("Advance adjusted against purchase"),
                )
                .await;
            match result {
                Ok(()) => posted += &application.applied,
                // Already posted by an earlier attempt; the key saw to it.
                Err(BooksError::DuplicateTransaction(_)) => posted += &application.applied,
                Err(err) => {
                    tracing::warn!(
                        bill_id = %bill_id,
                        reference = %reference,
                        error = %err,
                        "Reallocation posting interrupted"
                    );
                    return Err(BooksError::PartialAllocation {
                        allocated: total_applied,
                        posted,
                        source: Box::new(err),
                    });
                }
            }
        }

        tracing::info!(
            supplier_id = %supplier_id,
            bill_id = %bill_id,
            total_applied = %total_applied,
            advances_touched = applications.len(),
            "Advances adjusted against purchase"
        );
        Ok(total_applied)
    }
}

/// Walk open advances oldest-first and compute the mutations for one bill.
/// Pure planning step: nothing is persisted here.
fn plan_allocation(
    advances: Vec<SupplierAdvance>,
    bill_id: &str,
    bill_amount: &BigDecimal,
) -> Vec<Application> {
    let zero = BigDecimal::from(0);
    let threshold = exhaustion_threshold();
    let mut remaining_bill = bill_amount.clone();
    let mut applications = Vec::new();

    for mut advance in advances {
        if remaining_bill <= zero {
            break;
        }
        if advance.remaining_amount <= zero {
            continue;
        }

        let applied = advance.remaining_amount.clone().min(remaining_bill.clone());
        advance.used_amount += &applied;
        advance.remaining_amount -= &applied;
        if !advance.linked_bills.iter().any(|b| b == bill_id) {
            advance.linked_bills.push(bill_id.to_string());
        }
        advance.status = if advance.remaining_amount <= threshold {
            AdvanceStatus::FullyUsed
        } else {
            AdvanceStatus::PartiallyUsed
        };
        remaining_bill -= &applied;
        applications.push(Application { advance, applied });
    }

    applications
}
