// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HMAC key material for token signing and verification.
//!
//! The `JWT_SECRET` environment variable may carry several secrets separated
//! by commas. The first one signs new tokens; every listed secret is
//! accepted during verification, so secrets can be rotated without
//! invalidating tokens issued under the previous one.
//!
//! Secrets shorter than 32 bytes are stretched through SHA-256 before use,
//! so HS256 always operates on full-size key material. When no secret is
//! configured at all, a random ephemeral key is generated; tokens then stop
//! verifying on restart, which is acceptable for development only.

use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::config::Config;

/// HS256 wants at least this much key material.
const MIN_SECRET_BYTES: usize = 32;

pub struct KeyStore {
    encoding: EncodingKey,
    decoding: Vec<DecodingKey>,
    ephemeral: bool,
}

impl KeyStore {
    /// Build a key store from the `JWT_SECRET` environment variable,
    /// falling back to an ephemeral key when it is unset or blank.
    pub fn from_env() -> Self {
        Self::from_config(&Config::from_env())
    }

    /// Build a key store from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        match &config.jwt_secret {
            Some(raw) => Self::from_secrets(raw),
            None => Self::ephemeral(),
        }
    }

    /// Build a key store from a comma-separated secret list. The first
    /// entry signs; all entries verify. Blank entries are skipped.
    pub fn from_secrets(raw: &str) -> Self {
        let secrets: Vec<Vec<u8>> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| normalize_secret(s.as_bytes()))
            .collect();

        if secrets.is_empty() {
            return Self::ephemeral();
        }

        let encoding = EncodingKey::from_secret(&secrets[0]);
        let decoding = secrets
            .iter()
            .map(|s| DecodingKey::from_secret(s))
            .collect();

        Self {
            encoding,
            decoding,
            ephemeral: false,
        }
    }

    /// Generate a random single-use key. Tokens signed with it become
    /// unverifiable once the process exits.
    pub fn ephemeral() -> Self {
        warn!("JWT_SECRET is not configured, using an ephemeral signing key; issued tokens will not survive a restart");
        let mut secret = [0u8; 64];
        rand::thread_rng().fill_bytes(&mut secret);

        Self {
            encoding: EncodingKey::from_secret(&secret),
            decoding: vec![DecodingKey::from_secret(&secret)],
            ephemeral: true,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Key used for signing new tokens.
    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    /// Keys accepted during verification, in configuration order.
    pub(crate) fn decoding_keys(&self) -> &[DecodingKey] {
        &self.decoding
    }
}

/// Stretch short secrets through SHA-256 so HS256 never runs on weak key
/// material. Secrets already long enough pass through unchanged.
fn normalize_secret(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() >= MIN_SECRET_BYTES {
        bytes.to_vec()
    } else {
        warn!(
            length = bytes.len(),
            "Configured JWT secret is shorter than {MIN_SECRET_BYTES} bytes, stretching it through SHA-256"
        );
        Sha256::digest(bytes).to_vec()
    }
}
