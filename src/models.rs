// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Models
//!
//! Core data types for the banking ledger: clients, accounts, and the
//! immutable transaction records produced by every balance change.
//!
//! ## Identity
//!
//! Accounts carry two identifiers: an internal `id` (UUID, storage concern)
//! and an opaque `account_number` (the public identity callers use). The
//! number looks like a French IBAN (`FR` + 2 digits + 23 digits) but the
//! check segment is NOT a validated checksum; treat the whole string as
//! opaque.
//!
//! ## Wire Format
//!
//! Field names serialize in camelCase (`accountNumber`, `sourceAccount`,
//! ...) and enum values in SCREAMING case (`CHECKING`, `DEPOSIT`, ...).
//! Existing clients and persisted rows depend on these exact names.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Total length of a generated account number (`FR` + 2 + 23).
pub const ACCOUNT_NUMBER_LEN: usize = 27;

// =============================================================================
// Client
// =============================================================================

/// A bank client (account owner).
///
/// Accounts reference their owner by `id`; the client row never embeds its
/// accounts. The ledger engine reads clients only to validate ownership at
/// account creation; client lifecycle management is a caller concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Internal client identifier.
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub nationality: String,
}

// =============================================================================
// Account
// =============================================================================

/// Account product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Checking,
    Savings,
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Checking => write!(f, "CHECKING"),
            AccountType::Savings => write!(f, "SAVINGS"),
        }
    }
}

/// A bank account.
///
/// Created with a zero balance and a freshly generated account number.
/// The balance is mutated exclusively by the ledger engine and is never
/// negative after a committed operation. Accounts are never deleted by the
/// core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Internal identifier (storage concern, distinct from the number).
    pub id: Uuid,
    /// Opaque public identity, unique across all accounts.
    pub account_number: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Current balance. Never negative after a committed operation.
    pub balance: Decimal,
    /// Owning client (reference, not embedding).
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a fresh zero-balance account for `owner_id`.
    pub fn new(account_number: String, account_type: AccountType, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_number,
            account_type,
            balance: Decimal::ZERO,
            owner_id,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Kind of balance-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "DEPOSIT"),
            TransactionKind::Withdrawal => write!(f, "WITHDRAWAL"),
            TransactionKind::Transfer => write!(f, "TRANSFER"),
        }
    }
}

/// Immutable record of one balance-affecting event.
///
/// Shape invariant: a deposit has a destination only, a withdrawal a source
/// only, a transfer both (with distinct endpoints). Created exactly once
/// per successful ledger operation and never mutated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Always strictly positive.
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    /// Account number debited, if any (withdrawal, transfer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account: Option<String>,
    /// Account number credited, if any (deposit, transfer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Transaction {
    /// A deposit credited to `destination`.
    pub fn deposit(destination: &str, amount: Decimal, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TransactionKind::Deposit,
            amount,
            timestamp: Utc::now(),
            source_account: None,
            destination_account: Some(destination.to_string()),
            description,
        }
    }

    /// A withdrawal debited from `source`.
    pub fn withdrawal(source: &str, amount: Decimal, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TransactionKind::Withdrawal,
            amount,
            timestamp: Utc::now(),
            source_account: Some(source.to_string()),
            destination_account: None,
            description,
        }
    }

    /// A transfer moving `amount` from `source` to `destination`.
    pub fn transfer(
        source: &str,
        destination: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TransactionKind::Transfer,
            amount,
            timestamp: Utc::now(),
            source_account: Some(source.to_string()),
            destination_account: Some(destination.to_string()),
            description,
        }
    }

    /// Whether `account_number` participates in this transaction.
    pub fn touches(&self, account_number: &str) -> bool {
        self.source_account.as_deref() == Some(account_number)
            || self.destination_account.as_deref() == Some(account_number)
    }
}

// =============================================================================
// Account Number Generation
// =============================================================================

/// Generate one account-number candidate.
///
/// Format: `FR` + 2-digit check segment + 23-digit random body, 27 chars
/// total. The check segment is random; it is not a computable checksum and
/// must never be validated as one. Uniqueness is the caller's concern (the
/// engine retries against the store on collision).
pub fn random_account_number() -> String {
    let mut rng = rand::thread_rng();
    let check: u8 = rng.gen_range(0..100);
    let mut body = String::with_capacity(23);
    for _ in 0..23 {
        body.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    format!("FR{check:02}{body}")
}
