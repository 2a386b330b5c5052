//! Purchase accounting: bills, returns, and the supplier advance lifecycle

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::traits::{RecordStore, TransactionPoster};
use crate::types::*;
use crate::utils::validation::validate_positive_amount;

/// Parameters for recording an advance payment to a supplier.
#[derive(Debug, Clone)]
pub struct AdvanceRequest {
    pub business_id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub amount: BigDecimal,
    pub payment_mode: PaymentMode,
    pub payment_date: NaiveDate,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

/// Turns purchase bills and returns into canonical transactions and manages
/// the supplier advance lifecycle. Store and poster are constructor-injected.
pub struct PurchaseService<S: RecordStore, P: TransactionPoster> {
    pub(crate) store: S,
    pub(crate) poster: P,
}

impl<S: RecordStore, P: TransactionPoster> PurchaseService<S, P> {
    pub fn new(store: S, poster: P) -> Self {
        Self { store, poster }
    }

    /// Persist a purchase bill and post its canonical transaction.
    ///
    /// Idempotent per bill id: re-submission surfaces the Poster's
    /// [`BooksError::DuplicateTransaction`] unchanged, so the bill is never
    /// double-posted.
    pub async fn post_purchase_bill(&mut self, bill: &PurchaseBill) -> BooksResult<String> {
        validate_positive_amount(&bill.total_amount, "bill total")?;

        let items: Vec<TransactionItem> = bill
            .items
            .iter()
            .map(|item| TransactionItem {
                name: item.name.clone(),
                quantity: item.quantity.clone(),
                unit_cost: item.purchase_rate.clone(),
                gst_amount: item.gst_amount(),
            })
            .collect();

        let transaction = TransactionRecord {
            id: bill.id.clone(),
            business_id: bill.business_id.clone(),
            date: bill.date,
            txn_type: TransactionType::Purchase,
            party_id: bill.supplier_id.clone(),
            party_name: bill.supplier_name.clone(),
            sub_total: bill.sub_total.clone(),
            tax_amount: &bill.cgst + &bill.sgst + &bill.igst,
            total_amount: bill.total_amount.clone(),
            balance_amount: bill.pending_amount.clone(),
            payment_status: bill.status,
            due_date: bill.due_date,
            version: SCHEMA_VERSION,
            created_at: chrono::Utc::now().naive_utc(),
        };

        self.store.save_purchase_bill(bill).await?;
        self.poster
            .post_transaction(&transaction, &items, &bill.business_id)
            .await?;

        tracing::info!(bill_id = %bill.id, supplier_id = %bill.supplier_id, "Purchase bill posted");
        Ok(transaction.id)
    }

    /// Post a purchase return against an existing bill.
    ///
    /// Totals are taken as absolute values regardless of how the source
    /// items were signed. Returns the new transaction id.
    pub async fn process_purchase_return(
        &mut self,
        original_bill_id: &str,
        returned_items: &[BillItem],
        reason: Option<&str>,
    ) -> BooksResult<String> {
        let bill = self
            .store
            .get_purchase_bill(original_bill_id)
            .await?
            .ok_or_else(|| BooksError::NotFound(format!("purchase bill {}", original_bill_id)))?;

        let mut sub_total = BigDecimal::from(0);
        let mut tax_amount = BigDecimal::from(0);
        let items: Vec<TransactionItem> = returned_items
            .iter()
            .map(|item| {
                let line_value = (&item.quantity * &item.purchase_rate).abs();
                let gst = item.gst_amount().abs();
                sub_total += &line_value;
                tax_amount += &gst;
                TransactionItem {
                    name: item.name.clone(),
                    quantity: item.quantity.abs(),
                    unit_cost: item.purchase_rate.abs(),
                    gst_amount: gst,
                }
            })
            .collect();
        let total_amount = &sub_total + &tax_amount;
        validate_positive_amount(&total_amount, "return total")?;

        let return_id = format!("PRET-{}-{}", original_bill_id, Uuid::new_v4());
        let transaction = TransactionRecord {
            id: return_id.clone(),
            business_id: bill.business_id.clone(),
            date: chrono::Utc::now().date_naive(),
            txn_type: TransactionType::PurchaseReturn,
            party_id: bill.supplier_id.clone(),
            party_name: bill.supplier_name.clone(),
            sub_total,
            tax_amount,
            total_amount,
            balance_amount: BigDecimal::from(0),
            payment_status: PaymentStatus::Unpaid,
            due_date: None,
            version: SCHEMA_VERSION,
            created_at: chrono::Utc::now().naive_utc(),
        };

        self.poster
            .post_transaction(&transaction, &items, &bill.business_id)
            .await?;

        tracing::info!(
            return_id = %return_id,
            original_bill_id = %original_bill_id,
            reason = reason.unwrap_or("-"),
            "Purchase return posted"
        );
        Ok(return_id)
    }

    /// Record an advance payment to a supplier.
    ///
    /// The advance id is derived from the supplier id and the creation
    /// instant; an existing record under that id is a hard failure, never an
    /// overwrite. The payment is posted first, then the tracking record is
    /// persisted with nothing used yet.
    pub async fn record_advance_to_supplier(
        &mut self,
        request: AdvanceRequest,
    ) -> BooksResult<SupplierAdvance> {
        validate_positive_amount(&request.amount, "advance amount")?;

        let created_at = chrono::Utc::now().naive_utc();
        let advance_id = format!(
            "ADV-{}-{}",
            request.supplier_id,
            created_at.and_utc().timestamp_millis()
        );
        if self.store.get_advance(&advance_id).await?.is_some() {
            return Err(BooksError::DuplicateTransaction(format!(
                "advance id collision: {}",
                advance_id
            )));
        }

        self.poster
            .post_advance_payment(
                &advance_id,
                &request.business_id,
                &request.supplier_id,
                &request.amount,
                request.payment_mode,
                request.payment_date,
                request.notes.as_deref(),
            )
            .await?;

        let advance = SupplierAdvance {
            advance_id,
            business_id: request.business_id,
            supplier_id: request.supplier_id,
            supplier_name: request.supplier_name,
            amount: request.amount.clone(),
            used_amount: BigDecimal::from(0),
            remaining_amount: request.amount,
            payment_mode: request.payment_mode,
            payment_date: request.payment_date,
            reference_number: request.reference_number,
            notes: request.notes,
            status: AdvanceStatus::Active,
            linked_bills: Vec::new(),
            created_at,
            version: SCHEMA_VERSION,
        };
        self.store.save_advance(&advance).await?;

        tracing::info!(
            advance_id = %advance.advance_id,
            supplier_id = %advance.supplier_id,
            amount = %advance.amount,
            "Supplier advance recorded"
        );
        Ok(advance)
    }

    /// Total unconsumed advance amount held against one supplier.
    pub async fn get_supplier_advance_balance(
        &self,
        supplier_id: &str,
    ) -> BooksResult<BigDecimal> {
        let advances = self.store.advances_for_supplier(supplier_id, true).await?;
        Ok(advances.iter().map(|a| &a.remaining_amount).sum())
    }

    /// Advances of one supplier, oldest first; `active_only` restricts to
    /// open (Active / PartiallyUsed) records.
    pub async fn get_supplier_advances(
        &self,
        supplier_id: &str,
        active_only: bool,
    ) -> BooksResult<Vec<SupplierAdvance>> {
        self.store
            .advances_for_supplier(supplier_id, active_only)
            .await
    }

    /// All open advances across a business, oldest first.
    pub async fn get_all_pending_advances(
        &self,
        business_id: &str,
    ) -> BooksResult<Vec<SupplierAdvance>> {
        self.store.open_advances(business_id).await
    }
}
