//! Balance Service: current and historical ledger balances, trial balance

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::traits::RecordStore;
use crate::types::*;

/// Concurrency bound for batch balance computation. Each ledger's replay is
/// independent, so the batch fans out instead of iterating serially.
const BALANCE_CONCURRENCY: usize = 8;

/// Result of a trial balance verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    pub business_id: String,
    pub as_of: Option<NaiveDate>,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    pub difference: BigDecimal,
    pub is_balanced: bool,
}

/// Computes ledger balances from the cached value (fast path) or by replaying
/// journal entries from the opening balance (slow, audit-grade path).
pub struct BalanceService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> BalanceService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Balance of one ledger.
    ///
    /// With no `as_of` date this returns the cached `current_balance` in
    /// O(1). With a date it replays every journal line affecting the ledger
    /// dated on/before `as_of`, starting from `opening_balance`.
    ///
    /// A missing ledger fails with [`BooksError::NotFound`] rather than
    /// returning zero: a silently substituted zero would mask a missing or
    /// corrupt ledger reference.
    pub async fn calculate_balance(
        &self,
        ledger_id: &str,
        as_of: Option<NaiveDate>,
    ) -> BooksResult<BigDecimal> {
        let account = self
            .store
            .get_account(ledger_id)
            .await?
            .ok_or_else(|| BooksError::NotFound(format!("ledger {}", ledger_id)))?;

        let Some(as_of) = as_of else {
            return Ok(account.current_balance);
        };

        let entries = self
            .store
            .journal_entries_for_ledger(ledger_id, Some(as_of))
            .await?;

        let mut balance = account.opening_balance.clone();
        for entry in &entries {
            for line in entry.lines.iter().filter(|l| l.ledger_id == ledger_id) {
                if account.group.is_debit_normal() {
                    balance += &line.debit - &line.credit;
                } else {
                    balance += &line.credit - &line.debit;
                }
            }
        }
        Ok(balance)
    }

    /// Balances for a batch of ledgers, computed with bounded parallelism.
    /// Any single failure fails the whole batch.
    pub async fn calculate_balances(
        &self,
        ledger_ids: &[String],
        as_of: Option<NaiveDate>,
    ) -> BooksResult<HashMap<String, BigDecimal>> {
        stream::iter(ledger_ids)
            .map(|ledger_id| async move {
                let balance = self.calculate_balance(ledger_id, as_of).await?;
                Ok::<_, BooksError>((ledger_id.clone(), balance))
            })
            .buffer_unordered(BALANCE_CONCURRENCY)
            .try_collect()
            .await
    }

    /// Sum every ledger of a business into a debit bucket and a credit
    /// bucket. A non-negative balance lands on the account's normal side; a
    /// negative balance flips the bucket (contra balance, e.g. a bank
    /// overdraft). Balanced when `|difference| < 0.1`.
    pub async fn verify_trial_balance(
        &self,
        business_id: &str,
        as_of: Option<NaiveDate>,
    ) -> BooksResult<TrialBalanceReport> {
        let accounts = self.store.list_accounts(business_id).await?;
        let ledger_ids: Vec<String> = accounts.iter().map(|a| a.id.clone()).collect();
        let balances = self.calculate_balances(&ledger_ids, as_of).await?;

        let mut total_debit = BigDecimal::from(0);
        let mut total_credit = BigDecimal::from(0);
        for account in &accounts {
            let balance = balances.get(&account.id).cloned().unwrap_or_default();
            let negative = balance < BigDecimal::from(0);
            match (account.group.is_debit_normal(), negative) {
                (true, false) => total_debit += balance,
                (true, true) => total_credit += balance.abs(),
                (false, false) => total_credit += balance,
                (false, true) => total_debit += balance.abs(),
            }
        }

        let difference = &total_debit - &total_credit;
        let tolerance = BigDecimal::from(1) / BigDecimal::from(10);
        let is_balanced = difference.abs() < tolerance;

        tracing::debug!(
            business_id = %business_id,
            total_debit = %total_debit,
            total_credit = %total_credit,
            is_balanced,
            "Trial balance verified"
        );

        Ok(TrialBalanceReport {
            business_id: business_id.to_string(),
            as_of,
            total_debit,
            total_credit,
            difference,
            is_balanced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RecordStore;
    use crate::utils::MemoryStore;

    fn account(id: &str, group: AccountGroup) -> LedgerAccount {
        LedgerAccount::new(id.to_string(), "biz1".to_string(), id.to_string(), group)
    }

    fn entry(id: &str, date: (i32, u32, u32), lines: Vec<JournalLine>) -> JournalEntry {
        JournalEntry::balanced(
            id.to_string(),
            "biz1".to_string(),
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            lines,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn missing_ledger_fails_closed() {
        let service = BalanceService::new(MemoryStore::new());
        let err = service.calculate_balance("ghost", None).await.unwrap_err();
        assert!(matches!(err, BooksError::NotFound(_)));
    }

    #[tokio::test]
    async fn fast_path_returns_cached_balance() {
        let mut store = MemoryStore::new();
        let mut cash = account("cash", AccountGroup::Asset);
        cash.current_balance = BigDecimal::from(4200);
        store.save_account(&cash).await.unwrap();

        let service = BalanceService::new(store);
        let balance = service.calculate_balance("cash", None).await.unwrap();
        assert_eq!(balance, BigDecimal::from(4200));
    }

    #[tokio::test]
    async fn replay_starts_from_opening_balance() {
        let mut store = MemoryStore::new();
        let mut cash = account("cash", AccountGroup::Asset);
        cash.opening_balance = BigDecimal::from(100);
        store.save_account(&cash).await.unwrap();
        store.save_account(&account("sales", AccountGroup::Income)).await.unwrap();

        store
            .save_journal_entry(&entry(
                "je1",
                (2024, 1, 10),
                vec![
                    JournalLine::debit("cash".to_string(), BigDecimal::from(300)),
                    JournalLine::credit("sales".to_string(), BigDecimal::from(300)),
                ],
            ))
            .await
            .unwrap();
        store
            .save_journal_entry(&entry(
                "je2",
                (2024, 2, 10),
                vec![
                    JournalLine::debit("cash".to_string(), BigDecimal::from(50)),
                    JournalLine::credit("sales".to_string(), BigDecimal::from(50)),
                ],
            ))
            .await
            .unwrap();

        let service = BalanceService::new(store);
        let jan = service
            .calculate_balance("cash", NaiveDate::from_ymd_opt(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(jan, BigDecimal::from(400));

        let feb = service
            .calculate_balance("cash", NaiveDate::from_ymd_opt(2024, 2, 28))
            .await
            .unwrap();
        assert_eq!(feb, BigDecimal::from(450));

        // Credit-normal replay runs with flipped signs.
        let sales = service
            .calculate_balance("sales", NaiveDate::from_ymd_opt(2024, 2, 28))
            .await
            .unwrap();
        assert_eq!(sales, BigDecimal::from(350));
    }

    #[tokio::test]
    async fn batch_balances_cover_every_ledger() {
        let mut store = MemoryStore::new();
        for (id, group) in [
            ("cash", AccountGroup::Asset),
            ("payable", AccountGroup::Liability),
            ("sales", AccountGroup::Income),
        ] {
            store.save_account(&account(id, group)).await.unwrap();
        }
        let service = BalanceService::new(store);
        let balances = service
            .calculate_balances(
                &["cash".to_string(), "payable".to_string(), "sales".to_string()],
                None,
            )
            .await
            .unwrap();
        assert_eq!(balances.len(), 3);
        assert!(balances.values().all(|b| *b == BigDecimal::from(0)));
    }

    #[tokio::test]
    async fn empty_business_trial_balance_is_balanced_at_zero() {
        let service = BalanceService::new(MemoryStore::new());
        let report = service.verify_trial_balance("biz1", None).await.unwrap();
        assert_eq!(report.total_debit, BigDecimal::from(0));
        assert_eq!(report.total_credit, BigDecimal::from(0));
        assert!(report.is_balanced);
    }

    #[tokio::test]
    async fn contra_balance_flips_bucket() {
        let mut store = MemoryStore::new();
        // Overdrawn bank account: debit-normal asset with a negative balance.
        let mut bank = account("bank", AccountGroup::Asset);
        bank.current_balance = BigDecimal::from(-250);
        store.save_account(&bank).await.unwrap();
        let mut payable = account("payable", AccountGroup::Liability);
        payable.current_balance = BigDecimal::from(-250);
        store.save_account(&payable).await.unwrap();

        let service = BalanceService::new(store);
        let report = service.verify_trial_balance("biz1", None).await.unwrap();
        assert_eq!(report.total_credit, BigDecimal::from(250));
        assert_eq!(report.total_debit, BigDecimal::from(250));
        assert!(report.is_balanced);
    }
}
