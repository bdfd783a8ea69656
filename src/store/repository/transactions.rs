// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction repository: per-account history queries, windowed and paged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Transaction;
use crate::store::{BankStore, StoreResult};

/// Zero-based page request. Defaults to the first page of 20 rows.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

/// One page of results plus the total row count of the whole window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub page: u32,
    pub size: u32,
}

/// History queries for transactions.
pub struct TransactionRepository<'a> {
    store: &'a BankStore,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(store: &'a BankStore) -> Self {
        Self { store }
    }

    /// Look up a single transaction by id.
    pub fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        self.store.get_transaction(id)
    }

    /// All transactions touching the account in `[start, end)`, newest first.
    pub fn find_by_account_and_window(
        &self,
        account_number: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Transaction>> {
        self.store.transactions_in_window(account_number, start, end)
    }

    /// One page of the same window, newest first. `total_elements` counts
    /// the whole window, so the union of all pages equals the unpaged list.
    pub fn page_by_account_and_window(
        &self,
        account_number: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        request: PageRequest,
    ) -> StoreResult<Page<Transaction>> {
        let all = self.store.transactions_in_window(account_number, start, end)?;
        let total_elements = all.len() as u64;

        let offset = request.page as usize * request.size as usize;
        let content = all
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .collect();

        Ok(Page {
            content,
            total_elements,
            page: request.page,
            size: request.size,
        })
    }
}
