// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger engine: account lifecycle and money movement.
//!
//! Every mutation funnels into [`BankStore::commit_entry`], which applies
//! the balance deltas and the transaction record in one atomic commit. The
//! engine layer owns validation and error mapping; it never writes partial
//! state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::models::{random_account_number, Account, AccountType, Client, Transaction};
use crate::store::repository::{
    AccountRepository, ClientRepository, Page, PageRequest, TransactionRepository,
};
use crate::store::{BankStore, StoreError};

/// Attempts at generating a fresh account number before giving up.
const MAX_ACCOUNT_NUMBER_ATTEMPTS: u32 = 20;

pub struct LedgerEngine {
    store: Arc<BankStore>,
}

impl LedgerEngine {
    pub fn new(store: Arc<BankStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    // Clients and accounts
    // =========================================================================

    /// Register a new client.
    pub fn register_client(&self, client: Client) -> Result<Client> {
        ClientRepository::new(&self.store).create(&client)?;
        info!(client_id = %client.id, "Registered client");
        Ok(client)
    }

    /// Open a new account for an existing client.
    ///
    /// The account number is drawn at random and retried on collision, up
    /// to [`MAX_ACCOUNT_NUMBER_ATTEMPTS`] times.
    pub fn open_account(&self, owner_id: Uuid, account_type: AccountType) -> Result<Account> {
        self.open_account_with(owner_id, account_type, random_account_number)
    }

    fn open_account_with<F>(
        &self,
        owner_id: Uuid,
        account_type: AccountType,
        mut next_number: F,
    ) -> Result<Account>
    where
        F: FnMut() -> String,
    {
        if ClientRepository::new(&self.store).find_by_id(owner_id)?.is_none() {
            return Err(LedgerError::NotFound(format!("client {owner_id}")));
        }

        let accounts = AccountRepository::new(&self.store);
        for _ in 0..MAX_ACCOUNT_NUMBER_ATTEMPTS {
            let account = Account::new(next_number(), account_type, owner_id);
            match accounts.create(&account) {
                Ok(()) => {
                    info!(
                        account = %account.account_number,
                        owner = %owner_id,
                        kind = %account.account_type,
                        "Opened account"
                    );
                    return Ok(account);
                }
                // Collision with an existing number: draw again
                Err(StoreError::AlreadyExists(_)) => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(LedgerError::Internal(format!(
            "could not generate a unique account number after {MAX_ACCOUNT_NUMBER_ATTEMPTS} attempts"
        )))
    }

    /// Fetch an account by number.
    pub fn account(&self, account_number: &str) -> Result<Account> {
        AccountRepository::new(&self.store)
            .find_by_number(account_number)?
            .ok_or_else(|| LedgerError::NotFound(format!("account {account_number}")))
    }

    // =========================================================================
    // Money movement
    // =========================================================================

    /// Credit an account. Returns the completed transaction record.
    pub fn deposit(
        &self,
        account_number: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Transaction> {
        require_positive(amount)?;

        let tx = Transaction::deposit(account_number, amount, description);
        let updated = self
            .store
            .commit_entry(&[(account_number, amount)], &tx)
            .map_err(map_store_error)?;

        info!(
            tx_id = %tx.id,
            account = %account_number,
            %amount,
            balance = %updated[0].balance,
            "Deposit committed"
        );
        Ok(tx)
    }

    /// Debit an account. Fails with [`LedgerError::InsufficientFunds`] when
    /// the balance cannot cover the amount; nothing is written in that case.
    pub fn withdraw(
        &self,
        account_number: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Transaction> {
        require_positive(amount)?;

        let tx = Transaction::withdrawal(account_number, amount, description);
        let updated = self
            .store
            .commit_entry(&[(account_number, -amount)], &tx)
            .map_err(map_store_error)?;

        info!(
            tx_id = %tx.id,
            account = %account_number,
            %amount,
            balance = %updated[0].balance,
            "Withdrawal committed"
        );
        Ok(tx)
    }

    /// Move money between two distinct accounts in one atomic commit.
    pub fn transfer(
        &self,
        source_account: &str,
        destination_account: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Transaction> {
        require_positive(amount)?;
        if source_account == destination_account {
            return Err(LedgerError::Validation(
                "source and destination accounts must differ".into(),
            ));
        }

        let tx = Transaction::transfer(source_account, destination_account, amount, description);
        self.store
            .commit_entry(
                &[(source_account, -amount), (destination_account, amount)],
                &tx,
            )
            .map_err(map_store_error)?;

        info!(
            tx_id = %tx.id,
            source = %source_account,
            destination = %destination_account,
            %amount,
            "Transfer committed"
        );
        Ok(tx)
    }

    // =========================================================================
    // History queries
    // =========================================================================

    /// All transactions touching the account in `[start, end)`, newest
    /// first. Fails with not-found for an unknown account.
    pub fn transactions(
        &self,
        account_number: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        self.require_account(account_number)?;
        Ok(TransactionRepository::new(&self.store)
            .find_by_account_and_window(account_number, start, end)?)
    }

    /// One page of the same window, newest first.
    pub fn transactions_page(
        &self,
        account_number: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        request: PageRequest,
    ) -> Result<Page<Transaction>> {
        if request.size == 0 {
            return Err(LedgerError::Validation("page size must be positive".into()));
        }
        self.require_account(account_number)?;
        Ok(TransactionRepository::new(&self.store).page_by_account_and_window(
            account_number,
            start,
            end,
            request,
        )?)
    }

    fn require_account(&self, account_number: &str) -> Result<()> {
        if !AccountRepository::new(&self.store).exists(account_number)? {
            return Err(LedgerError::NotFound(format!("account {account_number}")));
        }
        Ok(())
    }
}

fn require_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn map_store_error(err: StoreError) -> LedgerError {
    match err {
        StoreError::NotFound(what) => LedgerError::NotFound(what),
        StoreError::InsufficientBalance {
            account,
            available,
            requested,
        } => {
            warn!(%account, %available, %requested, "Rejected overdraw");
            LedgerError::InsufficientFunds {
                required: requested,
                available,
            }
        }
        other => LedgerError::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rust_decimal_macros::dec;

    fn engine() -> (LedgerEngine, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = BankStore::open(&dir.path().join("test.redb")).unwrap();
        (LedgerEngine::new(Arc::new(store)), dir)
    }

    fn sample_client() -> Client {
        Client {
            id: Uuid::new_v4(),
            first_name: "Jean".into(),
            last_name: "Dupont".into(),
            birth_date: NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
            gender: "M".into(),
            address: "1 rue de la Paix, Paris".into(),
            phone: "+33612345678".into(),
            email: "jean.dupont@example.com".into(),
            nationality: "FR".into(),
        }
    }

    fn funded_account(engine: &LedgerEngine, amount: Decimal) -> Account {
        let client = engine.register_client(sample_client()).unwrap();
        let account = engine.open_account(client.id, AccountType::Checking).unwrap();
        if amount > Decimal::ZERO {
            engine.deposit(&account.account_number, amount, None).unwrap();
        }
        account
    }

    #[test]
    fn open_account_requires_existing_client() {
        let (engine, _dir) = engine();
        let result = engine.open_account(Uuid::new_v4(), AccountType::Checking);
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn open_account_starts_at_zero() {
        let (engine, _dir) = engine();
        let client = engine.register_client(sample_client()).unwrap();
        let account = engine.open_account(client.id, AccountType::Savings).unwrap();

        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.owner_id, client.id);
        assert_eq!(engine.account(&account.account_number).unwrap(), account);
    }

    #[test]
    fn open_account_redraws_on_number_collision() {
        let (engine, _dir) = engine();
        let client = engine.register_client(sample_client()).unwrap();
        let existing = engine.open_account(client.id, AccountType::Checking).unwrap();

        // First draw collides with the existing account, second is fresh
        let fresh = random_account_number();
        let mut draws = vec![fresh.clone(), existing.account_number.clone()];
        let account = engine
            .open_account_with(client.id, AccountType::Checking, || draws.pop().unwrap())
            .unwrap();

        assert_eq!(account.account_number, fresh);
        assert!(draws.is_empty(), "Both draws should have been consumed");
    }

    #[test]
    fn open_account_gives_up_after_bounded_attempts() {
        let (engine, _dir) = engine();
        let client = engine.register_client(sample_client()).unwrap();
        let existing = engine.open_account(client.id, AccountType::Checking).unwrap();

        let mut draws = 0;
        let result = engine.open_account_with(client.id, AccountType::Checking, || {
            draws += 1;
            existing.account_number.clone()
        });

        assert!(matches!(result, Err(LedgerError::Internal(_))));
        assert_eq!(draws, MAX_ACCOUNT_NUMBER_ATTEMPTS);
    }

    #[test]
    fn concurrent_withdrawals_never_overdraw() {
        let (engine, _dir) = engine();
        let account = funded_account(&engine, dec!(100));
        let engine = std::sync::Arc::new(engine);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = std::sync::Arc::clone(&engine);
            let number = account.account_number.clone();
            handles.push(std::thread::spawn(move || {
                let mut succeeded = 0u32;
                for _ in 0..10 {
                    if engine.withdraw(&number, dec!(10), None).is_ok() {
                        succeeded += 1;
                    }
                }
                succeeded
            }));
        }

        let succeeded: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // 80 attempts of 10 against a balance of 100: exactly 10 can land
        assert_eq!(succeeded, 10);
        assert_eq!(engine.account(&account.account_number).unwrap().balance, Decimal::ZERO);

        let history = engine
            .transactions(
                &account.account_number,
                Utc::now() - Duration::hours(1),
                Utc::now() + Duration::hours(1),
            )
            .unwrap();
        let withdrawals = history
            .iter()
            .filter(|tx| tx.kind == crate::models::TransactionKind::Withdrawal)
            .count();
        assert_eq!(withdrawals, 10);
    }

    #[test]
    fn deposit_then_withdraw_round_trip() {
        let (engine, _dir) = engine();
        let account = funded_account(&engine, dec!(0));

        engine.deposit(&account.account_number, dec!(500.00), None).unwrap();
        engine
            .withdraw(&account.account_number, dec!(120.50), Some("ATM".into()))
            .unwrap();

        assert_eq!(engine.account(&account.account_number).unwrap().balance, dec!(379.50));
    }

    #[test]
    fn withdraw_more_than_balance_is_rejected() {
        let (engine, _dir) = engine();
        let account = funded_account(&engine, dec!(100));

        let result = engine.withdraw(&account.account_number, dec!(100.01), None);
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(engine.account(&account.account_number).unwrap().balance, dec!(100));
    }

    #[test]
    fn rejected_withdrawal_after_deposit_keeps_the_balance() {
        let (engine, _dir) = engine();
        let account = funded_account(&engine, dec!(0));

        let tx = engine.deposit(&account.account_number, dec!(150.00), None).unwrap();
        assert_eq!(tx.kind, crate::models::TransactionKind::Deposit);
        assert_eq!(tx.amount, dec!(150.00));
        assert_eq!(engine.account(&account.account_number).unwrap().balance, dec!(150.00));

        let result = engine.withdraw(&account.account_number, dec!(200.00), None);
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(engine.account(&account.account_number).unwrap().balance, dec!(150.00));
    }

    #[test]
    fn withdraw_entire_balance_is_allowed() {
        let (engine, _dir) = engine();
        let account = funded_account(&engine, dec!(100));

        engine.withdraw(&account.account_number, dec!(100), None).unwrap();
        assert_eq!(engine.account(&account.account_number).unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let (engine, _dir) = engine();
        let account = funded_account(&engine, dec!(100));

        for amount in [dec!(0), dec!(-5)] {
            assert!(matches!(
                engine.deposit(&account.account_number, amount, None),
                Err(LedgerError::Validation(_))
            ));
            assert!(matches!(
                engine.withdraw(&account.account_number, amount, None),
                Err(LedgerError::Validation(_))
            ));
        }
    }

    #[test]
    fn transfer_moves_money_atomically() {
        let (engine, _dir) = engine();
        let source = funded_account(&engine, dec!(300));
        let destination = funded_account(&engine, dec!(0));

        let tx = engine
            .transfer(&source.account_number, &destination.account_number, dec!(75), None)
            .unwrap();

        assert_eq!(engine.account(&source.account_number).unwrap().balance, dec!(225));
        assert_eq!(engine.account(&destination.account_number).unwrap().balance, dec!(75));
        assert_eq!(tx.source_account.as_deref(), Some(source.account_number.as_str()));
        assert_eq!(
            tx.destination_account.as_deref(),
            Some(destination.account_number.as_str())
        );
    }

    #[test]
    fn transfer_to_same_account_is_rejected() {
        let (engine, _dir) = engine();
        let account = funded_account(&engine, dec!(100));

        let result = engine.transfer(
            &account.account_number,
            &account.account_number,
            dec!(10),
            None,
        );
        assert!(matches!(result, Err(LedgerError::Validation(_))));
        assert_eq!(engine.account(&account.account_number).unwrap().balance, dec!(100));
    }

    #[test]
    fn failed_transfer_leaves_both_balances_untouched() {
        let (engine, _dir) = engine();
        let source = funded_account(&engine, dec!(50));
        let destination = funded_account(&engine, dec!(0));

        let result = engine.transfer(
            &source.account_number,
            &destination.account_number,
            dec!(80),
            None,
        );
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(engine.account(&source.account_number).unwrap().balance, dec!(50));
        assert_eq!(engine.account(&destination.account_number).unwrap().balance, dec!(0));
    }

    #[test]
    fn transfer_to_unknown_account_rolls_back() {
        let (engine, _dir) = engine();
        let source = funded_account(&engine, dec!(100));

        let result = engine.transfer(
            &source.account_number,
            "FR0000000000000000000000000",
            dec!(30),
            None,
        );
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
        assert_eq!(engine.account(&source.account_number).unwrap().balance, dec!(100));
    }

    #[test]
    fn history_is_newest_first_and_filtered() {
        let (engine, _dir) = engine();
        let account = funded_account(&engine, dec!(0));
        let before = Utc::now() - Duration::seconds(1);

        engine.deposit(&account.account_number, dec!(10), None).unwrap();
        engine.deposit(&account.account_number, dec!(20), None).unwrap();
        engine.withdraw(&account.account_number, dec!(5), None).unwrap();

        let all = engine
            .transactions(&account.account_number, before, Utc::now() + Duration::hours(1))
            .unwrap();
        assert_eq!(all.len(), 3);
        for pair in all.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }

        // A window entirely in the past matches nothing
        let none = engine
            .transactions(&account.account_number, before - Duration::hours(2), before)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn history_for_unknown_account_is_not_found() {
        let (engine, _dir) = engine();
        let window = (Utc::now() - Duration::hours(1), Utc::now());

        assert!(matches!(
            engine.transactions("FR0000000000000000000000000", window.0, window.1),
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            engine.transactions_page(
                "FR0000000000000000000000000",
                window.0,
                window.1,
                PageRequest::default()
            ),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let (engine, _dir) = engine();
        let account = funded_account(&engine, dec!(0));

        let result = engine.transactions_page(
            &account.account_number,
            Utc::now() - Duration::hours(1),
            Utc::now(),
            PageRequest::new(0, 0),
        );
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn transfer_appears_in_both_histories() {
        let (engine, _dir) = engine();
        let source = funded_account(&engine, dec!(100));
        let destination = funded_account(&engine, dec!(0));
        let start = Utc::now() - Duration::hours(1);
        let end = Utc::now() + Duration::hours(1);

        let tx = engine
            .transfer(&source.account_number, &destination.account_number, dec!(25), None)
            .unwrap();

        let source_history = engine.transactions(&source.account_number, start, end).unwrap();
        let dest_history = engine
            .transactions(&destination.account_number, start, end)
            .unwrap();
        assert!(source_history.iter().any(|t| t.id == tx.id));
        assert!(dest_history.iter().any(|t| t.id == tx.id));
    }
}
