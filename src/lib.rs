// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Corebank - Embedded Banking Ledger Core
//!
//! This crate provides the transactional core of a retail banking back end:
//! client and account records, atomic money movement, windowed transaction
//! history, and stateless bearer-token authentication.
//!
//! ## Modules
//!
//! - `ledger` - Deposits, withdrawals, transfers, history queries
//! - `store` - Embedded ACID persistence (redb) and repositories
//! - `auth` - HS256 bearer tokens with secret rotation
//! - `models` - Domain entities and their wire format

pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod store;

pub use error::{LedgerError, Result};
pub use ledger::LedgerEngine;
