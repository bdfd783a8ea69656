// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless HS256 bearer tokens for the ledger service.
//!
//! ## Token Flow
//!
//! 1. A caller authenticates out of band and receives a signed JWT
//! 2. Every subsequent request carries `Authorization: Bearer <token>`
//! 3. [`TokenService::verify`] checks the signature against every
//!    configured secret and enforces expiry
//!
//! ## Key Rotation
//!
//! `JWT_SECRET` accepts a comma-separated list. The first secret signs new
//! tokens; all of them verify, so rotating a secret keeps outstanding
//! tokens valid until they expire.
//!
//! Clock skew tolerance is 60 seconds.

pub mod claims;
pub mod error;
pub mod keystore;
pub mod tokens;

pub use claims::Claims;
pub use error::AuthError;
pub use keystore::KeyStore;
pub use tokens::TokenService;
