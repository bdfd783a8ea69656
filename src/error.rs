// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger error type shared by every engine operation.

use rust_decimal::Decimal;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The caller supplied an invalid request (non-positive amount, equal
    /// transfer endpoints, zero page size).
    #[error("{0}")]
    Validation(String),

    /// A referenced account or client does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A debit would overdraw the account.
    #[error("insufficient funds: balance {available}, requested {required}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    /// The store failed beneath the engine.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// An internal invariant failed, e.g. account number generation kept
    /// colliding.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// Stable machine-readable code for logs and API mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::Storage(_) => "STORAGE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}
