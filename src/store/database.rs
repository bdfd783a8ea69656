// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded ledger database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `clients`: client id → serialized Client
//! - `accounts`: account number → serialized Account
//! - `transactions`: transaction id → serialized Transaction
//! - `account_tx_index`: composite key (account_number|!timestamp|tx_id) → role
//!
//! ## Atomicity
//!
//! [`BankStore::commit_entry`] applies every balance change of one ledger
//! operation together with its transaction record inside a single redb write
//! transaction: either all rows become visible or none do, including under a
//! process crash mid-operation. redb admits one write transaction at a time,
//! so the balance read that feeds each mutation happens under the same
//! serialized writer that commits it; concurrent operations on the same
//! account cannot lose updates.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Account, Client, Transaction};

// =============================================================================
// Table Definitions
// =============================================================================

/// Clients: client id (UUID string) → serialized Client (JSON bytes).
const CLIENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("clients");

/// Accounts: account number → serialized Account (JSON bytes).
const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Transactions: transaction id (UUID string) → serialized Transaction.
const TRANSACTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("transactions");

/// Index: composite key → role (`source`|`destination`).
/// Key format: `account_number|!timestamp_be|tx_id` for descending-time scans.
const ACCOUNT_TX_INDEX: TableDefinition<&[u8], &str> = TableDefinition::new("account_tx_index");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A debit would take the account below zero. Raised inside the write
    /// transaction, before anything is committed.
    #[error("account {account} holds {available}, cannot apply debit of {requested}")]
    InsufficientBalance {
        account: String,
        available: Decimal,
        requested: Decimal,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the account_tx_index table.
///
/// Format: `account_number | inverted_timestamp_be_bytes | tx_id`
///
/// The inverted timestamp ensures newest-first ordering when scanning
/// forward. Microsecond precision keeps same-second transactions apart;
/// remaining ties order by transaction id.
fn make_index_key(account_number: &str, timestamp_micros: i64, tx_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(account_number.len() + 1 + 8 + 1 + tx_id.len());
    key.extend_from_slice(account_number.as_bytes());
    key.push(b'|');
    // Invert timestamp for descending order (newest first)
    key.extend_from_slice(&(!timestamp_micros as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(tx_id.as_bytes());
    key
}

/// Build a prefix key for range scanning all transactions of an account.
fn make_prefix(account_number: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(account_number.len() + 1);
    prefix.extend_from_slice(account_number.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the `[lower, upper)` key bounds covering one account's index
/// entries whose timestamps fall in `[start_micros, end_micros]`.
///
/// Timestamps are inverted in the key, so the newest included instant
/// (`end_micros`) anchors the lower bound and the oldest (`start_micros`)
/// the upper one. The upper bound pads with 0xFF past the timestamp
/// segment to stay above every tx-id suffix.
fn make_window_bounds(
    account_number: &str,
    start_micros: i64,
    end_micros: i64,
) -> (Vec<u8>, Vec<u8>) {
    let mut lower = make_prefix(account_number);
    lower.extend_from_slice(&(!end_micros as u64).to_be_bytes());

    let mut upper = make_prefix(account_number);
    upper.extend_from_slice(&(!start_micros as u64).to_be_bytes());
    upper.extend_from_slice(&[0xFF; 16]);

    (lower, upper)
}

/// Extract the tx_id portion from a composite index key.
///
/// Key format: `account_number|timestamp_bytes|tx_id`
fn extract_tx_id_from_key(key: &[u8]) -> Option<String> {
    let mut pipe_count = 0;
    for (i, &b) in key.iter().enumerate() {
        if b == b'|' {
            pipe_count += 1;
            if pipe_count == 2 {
                return String::from_utf8(key[i + 1..].to_vec()).ok();
            }
        }
    }
    None
}

// =============================================================================
// BankStore
// =============================================================================

/// Embedded ACID store for clients, accounts, and transactions.
pub struct BankStore {
    db: Database,
}

impl BankStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CLIENTS)?;
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(TRANSACTIONS)?;
            let _ = write_txn.open_table(ACCOUNT_TX_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// Insert a new client.
    pub fn insert_client(&self, client: &Client) -> StoreResult<()> {
        let id = client.id.to_string();
        let json = serde_json::to_vec(client)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CLIENTS)?;
            if table.get(id.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("client {id}")));
            }
            table.insert(id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a client by id.
    pub fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CLIENTS)?;
        match table.get(id.to_string().as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Insert a new account, failing if the account number is already taken.
    ///
    /// The uniqueness check and the insert share one write transaction, so
    /// two concurrent creations of the same number cannot both succeed.
    pub fn insert_account(&self, account: &Account) -> StoreResult<()> {
        let json = serde_json::to_vec(account)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ACCOUNTS)?;
            if table.get(account.account_number.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!(
                    "account {}",
                    account.account_number
                )));
            }
            table.insert(account.account_number.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up an account by number.
    pub fn get_account(&self, account_number: &str) -> StoreResult<Option<Account>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(account_number)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Check whether an account number is taken.
    pub fn account_exists(&self, account_number: &str) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        Ok(table.get(account_number)?.is_some())
    }

    // =========================================================================
    // Atomic ledger entry
    // =========================================================================

    /// Apply one ledger operation: a set of signed balance deltas plus the
    /// transaction record, committed atomically.
    ///
    /// Each delta is `(account_number, amount)`; positive credits, negative
    /// debits. Balances are re-read inside the write transaction, so the
    /// arithmetic always sees the latest committed state. Fails without
    /// writing anything if an account is missing or a debit would overdraw
    /// it.
    ///
    /// Returns the updated accounts in delta order.
    pub fn commit_entry(
        &self,
        deltas: &[(&str, Decimal)],
        tx: &Transaction,
    ) -> StoreResult<Vec<Account>> {
        let tx_id = tx.id.to_string();
        let tx_json = serde_json::to_vec(tx)?;
        let timestamp_micros = tx.timestamp.timestamp_micros();

        let mut updated = Vec::with_capacity(deltas.len());

        let write_txn = self.db.begin_write()?;
        {
            let mut accounts = write_txn.open_table(ACCOUNTS)?;

            for (number, delta) in deltas {
                // Read the current row before mutating (borrow ends here)
                let existing_bytes = {
                    let existing = accounts
                        .get(*number)?
                        .ok_or_else(|| StoreError::NotFound(format!("account {number}")))?;
                    existing.value().to_vec()
                };

                let mut account: Account = serde_json::from_slice(&existing_bytes)?;
                let new_balance = account.balance + *delta;
                if new_balance < Decimal::ZERO {
                    return Err(StoreError::InsufficientBalance {
                        account: (*number).to_string(),
                        available: account.balance,
                        requested: -*delta,
                    });
                }
                account.balance = new_balance;

                let json = serde_json::to_vec(&account)?;
                accounts.insert(*number, json.as_slice())?;
                updated.push(account);
            }

            let mut transactions = write_txn.open_table(TRANSACTIONS)?;
            transactions.insert(tx_id.as_str(), tx_json.as_slice())?;

            let mut index = write_txn.open_table(ACCOUNT_TX_INDEX)?;
            if let Some(source) = &tx.source_account {
                let key = make_index_key(source, timestamp_micros, &tx_id);
                index.insert(key.as_slice(), "source")?;
            }
            if let Some(destination) = &tx.destination_account {
                let key = make_index_key(destination, timestamp_micros, &tx_id);
                index.insert(key.as_slice(), "destination")?;
            }
        }
        write_txn.commit()?;
        Ok(updated)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Look up a single transaction by id.
    pub fn get_transaction(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSACTIONS)?;
        match table.get(id.to_string().as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All transactions touching an account within the half-open window
    /// `[start, end)`, newest first.
    pub fn transactions_in_window(
        &self,
        account_number: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Transaction>> {
        if start >= end {
            return Ok(Vec::new());
        }

        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ACCOUNT_TX_INDEX)?;
        let transactions = read_txn.open_table(TRANSACTIONS)?;

        // Scan only the key slice whose timestamp segment can fall in the
        // window; the exact comparison below trims sub-microsecond edges.
        let (lower, upper) =
            make_window_bounds(account_number, start.timestamp_micros(), end.timestamp_micros());

        let mut results = Vec::new();
        let range = index.range(lower.as_slice()..upper.as_slice())?;

        for entry in range {
            let entry = entry?;
            let key_bytes = entry.0.value().to_vec();

            let Some(tx_id) = extract_tx_id_from_key(&key_bytes) else {
                continue;
            };
            let Some(value) = transactions.get(tx_id.as_str())? else {
                continue;
            };
            let tx: Transaction = serde_json::from_slice(value.value())?;

            // Half-open window: start inclusive, end exclusive
            if tx.timestamp >= start && tx.timestamp < end {
                results.push(tx);
            }
        }

        Ok(results)
    }
}

// =============================================================================
// Tests
// =============================================================================
