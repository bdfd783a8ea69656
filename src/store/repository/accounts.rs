// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account repository.

use crate::models::Account;
use crate::store::{BankStore, StoreResult};

/// Queries and inserts for accounts.
pub struct AccountRepository<'a> {
    store: &'a BankStore,
}

impl<'a> AccountRepository<'a> {
    pub fn new(store: &'a BankStore) -> Self {
        Self { store }
    }

    /// Insert a new account. Fails if the number is already taken.
    pub fn create(&self, account: &Account) -> StoreResult<()> {
        self.store.insert_account(account)
    }

    /// Look up an account by number.
    pub fn find_by_number(&self, account_number: &str) -> StoreResult<Option<Account>> {
        self.store.get_account(account_number)
    }

    /// Check whether an account number is taken.
    pub fn exists(&self, account_number: &str) -> StoreResult<bool> {
        self.store.account_exists(account_number)
    }
}
