//! Trait seams: record store abstraction and the Transaction Poster contract

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// Storage abstraction for the bookkeeping core
///
/// Lets the core work against any document store (Firestore-like remote
/// stores, SQL, in-memory, etc.). Reads take `&self`; writes take `&mut self`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Save a ledger account
    async fn save_account(&mut self, account: &LedgerAccount) -> BooksResult<()>;

    /// Get a ledger account by id
    async fn get_account(&self, ledger_id: &str) -> BooksResult<Option<LedgerAccount>>;

    /// List all ledger accounts of a business
    async fn list_accounts(&self, business_id: &str) -> BooksResult<Vec<LedgerAccount>>;

    /// Update a ledger account (cached balance updates come through here)
    async fn update_account(&mut self, account: &LedgerAccount) -> BooksResult<()>;

    /// Save a posted journal entry
    async fn save_journal_entry(&mut self, entry: &JournalEntry) -> BooksResult<()>;

    /// Journal entries touching a ledger, dated on/before `through` when given,
    /// in posting order
    async fn journal_entries_for_ledger(
        &self,
        ledger_id: &str,
        through: Option<NaiveDate>,
    ) -> BooksResult<Vec<JournalEntry>>;

    /// Save a canonical transaction record
    async fn save_transaction(&mut self, transaction: &TransactionRecord) -> BooksResult<()>;

    /// Get a canonical transaction record by id
    async fn get_transaction(&self, transaction_id: &str)
        -> BooksResult<Option<TransactionRecord>>;

    /// Save a raw sales record
    async fn save_sales_record(&mut self, record: &SalesRecord) -> BooksResult<()>;

    /// Sales records of a business dated within `[start, end]`
    async fn sales_in_period(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BooksResult<Vec<SalesRecord>>;

    /// Save a purchase bill
    async fn save_purchase_bill(&mut self, bill: &PurchaseBill) -> BooksResult<()>;

    /// Get a purchase bill by id
    async fn get_purchase_bill(&self, bill_id: &str) -> BooksResult<Option<PurchaseBill>>;

    /// Purchase bills of a business dated within `[start, end]`
    async fn purchase_bills_in_period(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BooksResult<Vec<PurchaseBill>>;

    /// Purchase bills with status Unpaid or Partial
    async fn outstanding_purchase_bills(&self, business_id: &str)
        -> BooksResult<Vec<PurchaseBill>>;

    /// Save a supplier advance tracking record
    async fn save_advance(&mut self, advance: &SupplierAdvance) -> BooksResult<()>;

    /// Get a supplier advance by id
    async fn get_advance(&self, advance_id: &str) -> BooksResult<Option<SupplierAdvance>>;

    /// Advances of one supplier, oldest payment date first. `open_only`
    /// restricts to Active / PartiallyUsed.
    async fn advances_for_supplier(
        &self,
        supplier_id: &str,
        open_only: bool,
    ) -> BooksResult<Vec<SupplierAdvance>>;

    /// All open advances of a business, oldest payment date first
    async fn open_advances(&self, business_id: &str) -> BooksResult<Vec<SupplierAdvance>>;

    /// Commit a batch of advance mutations as a single atomic unit:
    /// either every record is updated or none is.
    async fn update_advances_atomic(&mut self, advances: &[SupplierAdvance]) -> BooksResult<()>;
}

/// Contract of the persistent Transaction Poster (an external collaborator;
/// this core consumes it, never reimplements it)
///
/// Every method is idempotent per its key (transaction id / payment id /
/// advance id / reference id) and fails with
/// [`BooksError::DuplicateTransaction`] on resubmission of an already-posted
/// key. On success the poster atomically writes balanced journal lines and
/// updates each affected ledger's cached balance.
#[async_trait]
pub trait TransactionPoster: Send + Sync {
    /// Post a canonical transaction and its line items
    async fn post_transaction(
        &mut self,
        transaction: &TransactionRecord,
        items: &[TransactionItem],
        business_id: &str,
    ) -> BooksResult<()>;

    /// Post a party payment, keyed by `payment_id`
    #[allow(clippy::too_many_arguments)]
    async fn post_payment(
        &mut self,
        payment_id: &str,
        business_id: &str,
        party_id: &str,
        party_type: PartyType,
        amount: &BigDecimal,
        mode: PaymentMode,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> BooksResult<()>;

    /// Post an advance payment to a supplier (debit Advance-to-Supplier,
    /// credit cash/bank), keyed by `advance_id`
    #[allow(clippy::too_many_arguments)]
    async fn post_advance_payment(
        &mut self,
        advance_id: &str,
        business_id: &str,
        supplier_id: &str,
        amount: &BigDecimal,
        mode: PaymentMode,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> BooksResult<()>;

    /// Post a reallocation entry moving an applied advance against a payable
    /// (debit Supplier Payable, credit Advance-to-Supplier), keyed by
    /// `reference_id`
    async fn adjust_advance_to_payable(
        &mut self,
        business_id: &str,
        party_id: &str,
        amount: &BigDecimal,
        reference_id: &str,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> BooksResult<()>;
}
