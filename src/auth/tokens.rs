// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token issuing and verification (HS256).

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use tracing::debug;

use super::claims::Claims;
use super::error::AuthError;
use super::keystore::KeyStore;

/// Clock skew tolerance for expiry checks (seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

pub struct TokenService {
    keys: KeyStore,
    validity: Duration,
}

impl TokenService {
    pub fn new(keys: KeyStore, validity: Duration) -> Self {
        Self { keys, validity }
    }

    /// Issue a token for the subject, signed with the primary key.
    pub fn sign(&self, subject: &str, roles: Vec<String>) -> Result<String, AuthError> {
        let claims = Claims::new(subject, roles, self.validity);
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            self.keys.encoding_key(),
        )
        .map_err(|err| AuthError::Signing(err.to_string()))
    }

    /// Verify a token against every accepted key and return its claims.
    ///
    /// Keys are tried in configuration order so the common case (a token
    /// signed with the current key) resolves on the first attempt. When
    /// every key fails, the error from the last attempt is returned; an
    /// expired-but-well-signed token therefore reports expiry rather than
    /// a signature mismatch.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;

        let mut last_error = AuthError::MalformedToken;
        for (i, key) in self.keys.decoding_keys().iter().enumerate() {
            match decode::<Claims>(token, key, &validation) {
                Ok(data) => {
                    if i > 0 {
                        debug!(key_index = i, "Token verified with a rotated key");
                    }
                    return Ok(data.claims);
                }
                Err(err) => last_error = err.into(),
            }
        }
        Err(last_error)
    }
}
