//! In-memory Transaction Poster honouring the external poster contract
//!
//! Used by tests and demos. Posts balanced journal entries into a
//! [`MemoryStore`] and maintains each ledger's cached balance, with
//! idempotency per posting key exactly as the production poster guarantees.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::traits::{RecordStore, TransactionPoster};
use crate::types::*;
use crate::utils::memory_store::MemoryStore;

/// Ledger account ids the poster maps postings onto.
#[derive(Debug, Clone)]
pub struct PosterAccounts {
    pub cash: String,
    pub sales: String,
    pub purchases: String,
    pub customer_receivable: String,
    pub supplier_payable: String,
    pub advance_to_supplier: String,
}

/// Test double for the persistent Transaction Poster.
#[derive(Debug, Clone)]
pub struct MemoryPoster {
    store: MemoryStore,
    accounts: PosterAccounts,
    posted: Arc<RwLock<HashSet<String>>>,
}

impl MemoryPoster {
    pub fn new(store: MemoryStore, accounts: PosterAccounts) -> Self {
        Self {
            store,
            accounts,
            posted: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    fn claim_key(&self, key: &str) -> BooksResult<()> {
        let mut posted = self.posted.write().unwrap();
        if !posted.insert(key.to_string()) {
            return Err(BooksError::DuplicateTransaction(key.to_string()));
        }
        Ok(())
    }

    fn release_key(&self, key: &str) {
        self.posted.write().unwrap().remove(key);
    }

    /// Write the entry and update each affected cached balance. Rolls the
    /// idempotency claim back if any step fails, so the caller may retry.
    async fn post_entry(
        &mut self,
        key: &str,
        business_id: &str,
        date: NaiveDate,
        lines: Vec<JournalLine>,
        narration: Option<String>,
    ) -> BooksResult<()> {
        self.claim_key(key)?;
        let result = self
            .write_entry(key, business_id, date, lines, narration)
            .await;
        if result.is_err() {
            self.release_key(key);
        }
        result
    }

    async fn write_entry(
        &mut self,
        key: &str,
        business_id: &str,
        date: NaiveDate,
        lines: Vec<JournalLine>,
        narration: Option<String>,
    ) -> BooksResult<()> {
        let entry = JournalEntry::balanced(
            key.to_string(),
            business_id.to_string(),
            date,
            lines,
            narration,
        )?;
        for line in &entry.lines {
            let mut account = self
                .store
                .get_account(&line.ledger_id)
                .await?
                .ok_or_else(|| BooksError::NotFound(format!("ledger {}", line.ledger_id)))?;
            account.apply_line(line);
            self.store.update_account(&account).await?;
        }
        self.store.save_journal_entry(&entry).await
    }
}

#[async_trait]
impl TransactionPoster for MemoryPoster {
    async fn post_transaction(
        &mut self,
        transaction: &TransactionRecord,
        _items: &[TransactionItem],
        business_id: &str,
    ) -> BooksResult<()> {
        let a = self.accounts.clone();
        let amount = transaction.total_amount.clone();
        let (debit_account, credit_account) = match transaction.txn_type {
            TransactionType::Sale => (a.cash, a.sales),
            TransactionType::SaleReturn => (a.sales, a.cash),
            TransactionType::Purchase => (a.purchases, a.supplier_payable),
            TransactionType::PurchaseReturn => (a.supplier_payable, a.purchases),
            TransactionType::Payment => (a.supplier_payable, a.cash),
            TransactionType::Advance => (a.advance_to_supplier, a.cash),
        };
        let lines = vec![
            JournalLine::debit(debit_account, amount.clone()),
            JournalLine::credit(credit_account, amount),
        ];
        self.store.save_transaction(transaction).await?;
        let key = transaction.id.clone();
        self.post_entry(
            &key,
            business_id,
            transaction.date,
            lines,
            Some(format!("{:?} {}", transaction.txn_type, transaction.id)),
        )
        .await
    }

    async fn post_payment(
        &mut self,
        payment_id: &str,
        business_id: &str,
        _party_id: &str,
        party_type: PartyType,
        amount: &BigDecimal,
        _mode: PaymentMode,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> BooksResult<()> {
        let a = self.accounts.clone();
        let lines = match party_type {
            PartyType::Supplier => vec![
                JournalLine::debit(a.supplier_payable, amount.clone()),
                JournalLine::credit(a.cash, amount.clone()),
            ],
            PartyType::Customer => vec![
                JournalLine::debit(a.cash, amount.clone()),
                JournalLine::credit(a.customer_receivable, amount.clone()),
            ],
        };
        self.post_entry(
            payment_id,
            business_id,
            date,
            lines,
            notes.map(str::to_string),
        )
        .await
    }

    async fn post_advance_payment(
        &mut self,
        advance_id: &str,
        business_id: &str,
        _supplier_id: &str,
        amount: &BigDecimal,
        _mode: PaymentMode,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> BooksResult<()> {
        let a = self.accounts.clone();
        let lines = vec![
            JournalLine::debit(a.advance_to_supplier, amount.clone()),
            JournalLine::credit(a.cash, amount.clone()),
        ];
        self.post_entry(
            advance_id,
            business_id,
            date,
            lines,
            notes.map(str::to_string),
        )
        .await
    }

    async fn adjust_advance_to_payable(
        &mut self,
        business_id: &str,
        _party_id: &str,
        amount: &BigDecimal,
        reference_id: &str,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> BooksResult<()> {
        let a = self.accounts.clone();
        let lines = vec![
            JournalLine::debit(a.supplier_payable, amount.clone()),
            JournalLine::credit(a.advance_to_supplier, amount.clone()),
        ];
        self.post_entry(
            reference_id,
            business_id,
            date,
            lines,
            notes.map(str::to_string),
        )
        .await
    }
}
