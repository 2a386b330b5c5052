//! In-memory record store for testing and development

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::RecordStore;
use crate::types::*;
use crate::utils::validation::check_schema_version;

/// In-memory [`RecordStore`] implementation backed by shared maps.
///
/// Clones share the same underlying data, which lets a store instance be
/// handed to several services (and the test poster) at once.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    accounts: Arc<RwLock<HashMap<String, LedgerAccount>>>,
    journal: Arc<RwLock<Vec<JournalEntry>>>,
    transactions: Arc<RwLock<HashMap<String, TransactionRecord>>>,
    sales: Arc<RwLock<HashMap<String, SalesRecord>>>,
    bills: Arc<RwLock<HashMap<String, PurchaseBill>>>,
    advances: Arc<RwLock<HashMap<String, SupplierAdvance>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all data (useful between tests)
    pub fn clear(&self) {
        self.accounts.write().unwrap().clear();
        self.journal.write().unwrap().clear();
        self.transactions.write().unwrap().clear();
        self.sales.write().unwrap().clear();
        self.bills.write().unwrap().clear();
        self.advances.write().unwrap().clear();
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn save_account(&mut self, account: &LedgerAccount) -> BooksResult<()> {
        self.accounts
            .write()
            .unwrap()
            .insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, ledger_id: &str) -> BooksResult<Option<LedgerAccount>> {
        let account = self.accounts.read().unwrap().get(ledger_id).cloned();
        if let Some(ref a) = account {
            check_schema_version("LedgerAccount", a.version)?;
        }
        Ok(account)
    }

    async fn list_accounts(&self, business_id: &str) -> BooksResult<Vec<LedgerAccount>> {
        Ok(self
            .accounts
            .read()
            .unwrap()
            .values()
            .filter(|a| a.business_id == business_id)
            .cloned()
            .collect())
    }

    async fn update_account(&mut self, account: &LedgerAccount) -> BooksResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        if !accounts.contains_key(&account.id) {
            return Err(BooksError::NotFound(format!("ledger {}", account.id)));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn save_journal_entry(&mut self, entry: &JournalEntry) -> BooksResult<()> {
        self.journal.write().unwrap().push(entry.clone());
        Ok(())
    }

    async fn journal_entries_for_ledger(
        &self,
        ledger_id: &str,
        through: Option<NaiveDate>,
    ) -> BooksResult<Vec<JournalEntry>> {
        Ok(self
            .journal
            .read()
            .unwrap()
            .iter()
            .filter(|e| {
                e.lines.iter().any(|l| l.ledger_id == ledger_id)
                    && through.is_none_or(|d| e.date <= d)
            })
            .cloned()
            .collect())
    }

    async fn save_transaction(&mut self, transaction: &TransactionRecord) -> BooksResult<()> {
        self.transactions
            .write()
            .unwrap()
            .insert(transaction.id.clone(), transaction.clone());
        Ok(())
    }

    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> BooksResult<Option<TransactionRecord>> {
        let txn = self.transactions.read().unwrap().get(transaction_id).cloned();
        if let Some(ref t) = txn {
            check_schema_version("TransactionRecord", t.version)?;
        }
        Ok(txn)
    }

    async fn save_sales_record(&mut self, record: &SalesRecord) -> BooksResult<()> {
        self.sales
            .write()
            .unwrap()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn sales_in_period(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BooksResult<Vec<SalesRecord>> {
        Ok(self
            .sales
            .read()
            .unwrap()
            .values()
            .filter(|s| s.business_id == business_id && s.date >= start && s.date <= end)
            .cloned()
            .collect())
    }

    async fn save_purchase_bill(&mut self, bill: &PurchaseBill) -> BooksResult<()> {
        self.bills
            .write()
            .unwrap()
            .insert(bill.id.clone(), bill.clone());
        Ok(())
    }

    async fn get_purchase_bill(&self, bill_id: &str) -> BooksResult<Option<PurchaseBill>> {
        let bill = self.bills.read().unwrap().get(bill_id).cloned();
        if let Some(ref b) = bill {
            check_schema_version("PurchaseBill", b.version)?;
        }
        Ok(bill)
    }

    async fn purchase_bills_in_period(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BooksResult<Vec<PurchaseBill>> {
        Ok(self
            .bills
            .read()
            .unwrap()
            .values()
            .filter(|b| b.business_id == business_id && b.date >= start && b.date <= end)
            .cloned()
            .collect())
    }

    async fn outstanding_purchase_bills(
        &self,
        business_id: &str,
    ) -> BooksResult<Vec<PurchaseBill>> {
        Ok(self
            .bills
            .read()
            .unwrap()
            .values()
            .filter(|b| {
                b.business_id == business_id
                    && matches!(b.status, PaymentStatus::Unpaid | PaymentStatus::Partial)
            })
            .cloned()
            .collect())
    }

    async fn save_advance(&mut self, advance: &SupplierAdvance) -> BooksResult<()> {
        self.advances
            .write()
            .unwrap()
            .insert(advance.advance_id.clone(), advance.clone());
        Ok(())
    }

    async fn get_advance(&self, advance_id: &str) -> BooksResult<Option<SupplierAdvance>> {
        let advance = self.advances.read().unwrap().get(advance_id).cloned();
        if let Some(ref a) = advance {
            check_schema_version("SupplierAdvance", a.version)?;
        }
        Ok(advance)
    }

    async fn advances_for_supplier(
        &self,
        supplier_id: &str,
        open_only: bool,
    ) -> BooksResult<Vec<SupplierAdvance>> {
        let mut advances: Vec<SupplierAdvance> = self
            .advances
            .read()
            .unwrap()
            .values()
            .filter(|a| a.supplier_id == supplier_id && (!open_only || a.is_open()))
            .cloned()
            .collect();
        advances.sort_by(|a, b| {
            a.payment_date
                .cmp(&b.payment_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(advances)
    }

    async fn open_advances(&self, business_id: &str) -> BooksResult<Vec<SupplierAdvance>> {
        let mut advances: Vec<SupplierAdvance> = self
            .advances
            .read()
            .unwrap()
            .values()
            .filter(|a| a.business_id == business_id && a.is_open())
            .cloned()
            .collect();
        advances.sort_by(|a, b| {
            a.payment_date
                .cmp(&b.payment_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(advances)
    }

    async fn update_advances_atomic(&mut self, updates: &[SupplierAdvance]) -> BooksResult<()> {
        let mut advances = self.advances.write().unwrap();
        // All-or-nothing: reject the whole batch before touching anything.
        for advance in updates {
            if !advances.contains_key(&advance.advance_id) {
                return Err(BooksError::NotFound(format!(
                    "advance {}",
                    advance.advance_id
                )));
            }
        }
        for advance in updates {
            advances.insert(advance.advance_id.clone(), advance.clone());
        }
        Ok(())
    }
}
