//! Core types and data structures for the bookkeeping system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Schema version stamped on every persisted record and validated on read.
pub const SCHEMA_VERSION: u16 = 1;

/// Account groups following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountGroup {
    /// Assets - what the business owns (Cash, Inventory, Advance to Supplier, etc.)
    Asset,
    /// Liabilities - what the business owes (Supplier Payable, GST Payable, etc.)
    Liability,
    /// Equity - owner's interest in the business
    Equity,
    /// Income/Revenue - money earned by the business
    Income,
    /// Expenses - costs incurred by the business
    Expense,
}

impl AccountGroup {
    /// Assets and Expenses normally carry debit balances;
    /// Liabilities, Equity, and Income carry credit balances.
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountGroup::Asset | AccountGroup::Expense)
    }
}

/// A ledger account with a cached running balance.
///
/// `current_balance` is maintained by the Transaction Poster as entries are
/// posted; this core only consumes it. Historical balances are reconstructed
/// by replaying journal lines from `opening_balance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub group: AccountGroup,
    pub opening_balance: BigDecimal,
    pub current_balance: BigDecimal,
    pub version: u16,
    pub created_at: NaiveDateTime,
}

impl LedgerAccount {
    pub fn new(id: String, business_id: String, name: String, group: AccountGroup) -> Self {
        Self {
            id,
            business_id,
            name,
            group,
            opening_balance: BigDecimal::from(0),
            current_balance: BigDecimal::from(0),
            version: SCHEMA_VERSION,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Apply one journal line to the cached balance under the sign rule:
    /// a debit increases a debit-normal account and decreases a credit-normal
    /// one; a credit does the inverse.
    pub fn apply_line(&mut self, line: &JournalLine) {
        let delta = if self.group.is_debit_normal() {
            &line.debit - &line.credit
        } else {
            &line.credit - &line.debit
        };
        self.current_balance += delta;
    }
}

/// One side of a journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub ledger_id: String,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
}

impl JournalLine {
    pub fn debit(ledger_id: String, amount: BigDecimal) -> Self {
        Self {
            ledger_id,
            debit: amount,
            credit: BigDecimal::from(0),
        }
    }

    pub fn credit(ledger_id: String, amount: BigDecimal) -> Self {
        Self {
            ledger_id,
            debit: BigDecimal::from(0),
            credit: amount,
        }
    }
}

/// A posted journal entry. Invariant: sum of debits equals sum of credits
/// across all lines (enforced by the Poster, re-verified here by replay).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub business_id: String,
    pub date: NaiveDate,
    pub lines: Vec<JournalLine>,
    pub narration: Option<String>,
}

impl JournalEntry {
    pub fn total_debits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit).sum()
    }

    pub fn total_credits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total_debits() == self.total_credits()
    }

    /// Build an entry, rejecting one that does not balance.
    pub fn balanced(
        id: String,
        business_id: String,
        date: NaiveDate,
        lines: Vec<JournalLine>,
        narration: Option<String>,
    ) -> BooksResult<Self> {
        let entry = Self {
            id,
            business_id,
            date,
            lines,
            narration,
        };
        if entry.lines.len() < 2 {
            return Err(BooksError::Validation(
                "Journal entry needs at least two lines".to_string(),
            ));
        }
        if !entry.is_balanced() {
            return Err(BooksError::Validation(format!(
                "Journal entry is not balanced: debits = {}, credits = {}",
                entry.total_debits(),
                entry.total_credits()
            )));
        }
        Ok(entry)
    }
}

/// Canonical transaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Sale,
    SaleReturn,
    Purchase,
    PurchaseReturn,
    Payment,
    Advance,
}

/// Settlement state of a bill or invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

/// Canonical transaction handed to the Transaction Poster.
///
/// Immutable once posted; corrections are new reversing transactions,
/// never in-place edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub business_id: String,
    pub date: NaiveDate,
    pub txn_type: TransactionType,
    pub party_id: String,
    pub party_name: String,
    pub sub_total: BigDecimal,
    pub tax_amount: BigDecimal,
    pub total_amount: BigDecimal,
    pub balance_amount: BigDecimal,
    pub payment_status: PaymentStatus,
    pub due_date: Option<NaiveDate>,
    pub version: u16,
    pub created_at: NaiveDateTime,
}

/// Line item accompanying a canonical transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub name: String,
    pub quantity: BigDecimal,
    /// Cost price; for purchases this is the purchase rate.
    pub unit_cost: BigDecimal,
    /// Net GST on the line (cgst + sgst + igst).
    pub gst_amount: BigDecimal,
}

/// Kind of a raw sales document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalesRecordType {
    Sale,
    SaleReturn,
    Export,
}

/// Raw sales document as captured at the point of sale.
///
/// The Tax Compliance Service reads these directly rather than journal
/// entries, so that GST reconciliation is a genuine cross-check against the
/// ledger-backed view instead of a tautology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: String,
    pub business_id: String,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub record_type: SalesRecordType,
    pub customer_name: String,
    pub customer_gstin: Option<String>,
    pub is_inter_state: bool,
    pub taxable_value: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
    pub total_amount: BigDecimal,
    pub reversed: bool,
    pub version: u16,
}

/// Line item on a purchase bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub name: String,
    pub quantity: BigDecimal,
    pub purchase_rate: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
}

impl BillItem {
    /// Net GST on the line.
    pub fn gst_amount(&self) -> BigDecimal {
        &self.cgst + &self.sgst + &self.igst
    }
}

/// A supplier purchase bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseBill {
    pub id: String,
    pub business_id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_gstin: Option<String>,
    pub date: NaiveDate,
    pub sub_total: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
    pub total_amount: BigDecimal,
    pub pending_amount: BigDecimal,
    pub status: PaymentStatus,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<BillItem>,
    pub version: u16,
}

/// Lifecycle of a supplier advance. Transitions are monotonic:
/// Active -> PartiallyUsed -> FullyUsed, never reversed without an explicit
/// reversal transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvanceStatus {
    Active,
    PartiallyUsed,
    FullyUsed,
}

/// Mode of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    BankTransfer,
    Upi,
    Cheque,
}

/// Which side of the business a party sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyType {
    Customer,
    Supplier,
}

/// Tracking record for an advance paid to a supplier.
///
/// Invariant: `remaining_amount == amount - used_amount >= 0`. Mutated only
/// by the FIFO allocation algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierAdvance {
    pub advance_id: String,
    pub business_id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub amount: BigDecimal,
    pub used_amount: BigDecimal,
    pub remaining_amount: BigDecimal,
    pub payment_mode: PaymentMode,
    pub payment_date: NaiveDate,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub status: AdvanceStatus,
    /// Bill ids this advance has been applied to, in application order.
    pub linked_bills: Vec<String>,
    pub created_at: NaiveDateTime,
    pub version: u16,
}

impl SupplierAdvance {
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            AdvanceStatus::Active | AdvanceStatus::PartiallyUsed
        )
    }
}

/// Errors that can occur in the bookkeeping core
#[derive(Debug, thiserror::Error)]
pub enum BooksError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(String),
    #[error("Allocation interrupted after posting {posted} of {allocated} applied: {source}")]
    PartialAllocation {
        /// Amount committed against advance records.
        allocated: BigDecimal,
        /// Amount whose reallocation postings reached the ledger.
        posted: BigDecimal,
        #[source]
        source: Box<BooksError>,
    },
    #[error("Schema version mismatch on {record}: expected {expected}, found {found}")]
    SchemaVersion {
        record: String,
        expected: u16,
        found: u16,
    },
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for bookkeeping operations
pub type BooksResult<T> = Result<T, BooksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_normal_sides() {
        assert!(AccountGroup::Asset.is_debit_normal());
        assert!(AccountGroup::Expense.is_debit_normal());
        assert!(!AccountGroup::Liability.is_debit_normal());
        assert!(!AccountGroup::Income.is_debit_normal());
        assert!(!AccountGroup::Equity.is_debit_normal());
    }

    #[test]
    fn apply_line_follows_sign_rule() {
        let mut cash = LedgerAccount::new(
            "cash".to_string(),
            "biz1".to_string(),
            "Cash".to_string(),
            AccountGroup::Asset,
        );
        cash.apply_line(&JournalLine::debit("cash".to_string(), BigDecimal::from(500)));
        assert_eq!(cash.current_balance, BigDecimal::from(500));
        cash.apply_line(&JournalLine::credit("cash".to_string(), BigDecimal::from(200)));
        assert_eq!(cash.current_balance, BigDecimal::from(300));

        let mut payable = LedgerAccount::new(
            "payable".to_string(),
            "biz1".to_string(),
            "Supplier Payable".to_string(),
            AccountGroup::Liability,
        );
        payable.apply_line(&JournalLine::credit(
            "payable".to_string(),
            BigDecimal::from(500),
        ));
        assert_eq!(payable.current_balance, BigDecimal::from(500));
        payable.apply_line(&JournalLine::debit(
            "payable".to_string(),
            BigDecimal::from(100),
        ));
        assert_eq!(payable.current_balance, BigDecimal::from(400));
    }

    #[test]
    fn balanced_entry_construction() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let ok = JournalEntry::balanced(
            "je1".to_string(),
            "biz1".to_string(),
            date,
            vec![
                JournalLine::debit("cash".to_string(), BigDecimal::from(100)),
                JournalLine::credit("sales".to_string(), BigDecimal::from(100)),
            ],
            None,
        );
        assert!(ok.is_ok());

        let unbalanced = JournalEntry::balanced(
            "je2".to_string(),
            "biz1".to_string(),
            date,
            vec![
                JournalLine::debit("cash".to_string(), BigDecimal::from(100)),
                JournalLine::credit("sales".to_string(), BigDecimal::from(90)),
            ],
            None,
        );
        assert!(unbalanced.is_err());

        let single = JournalEntry::balanced(
            "je3".to_string(),
            "biz1".to_string(),
            date,
            vec![JournalLine::debit("cash".to_string(), BigDecimal::from(0))],
            None,
        );
        assert!(single.is_err());
    }
}
