// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persistence layer: the embedded [`BankStore`] plus typed repositories on
//! top of it.

pub mod database;
pub mod repository;

pub use database::{BankStore, StoreError, StoreResult};
