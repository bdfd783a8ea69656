// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use jsonwebtoken::errors::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token `exp` lies in the past (beyond clock-skew leeway).
    #[error("Token has expired")]
    TokenExpired,

    /// Signature did not verify under any accepted key.
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Token could not be parsed as a JWT at all.
    #[error("Token is malformed")]
    MalformedToken,

    /// Any other verification failure.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Signing failed.
    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// Stable machine-readable code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::Signing(_) => "signing_error",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidToken => AuthError::MalformedToken,
            other => AuthError::InvalidToken(format!("{other:?}")),
        }
    }
}
