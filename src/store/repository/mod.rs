// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed repositories over [`BankStore`](super::BankStore).
//!
//! Each repository borrows the store and exposes the queries one entity
//! needs; ledger-wide atomic mutations stay on the store itself.

pub mod accounts;
pub mod clients;
pub mod transactions;

pub use accounts::AccountRepository;
pub use clients::ClientRepository;
pub use transactions::{Page, PageRequest, TransactionRepository};
