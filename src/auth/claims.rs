// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims carried by bearer tokens.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// Claims embedded in every issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the authenticated username.
    pub sub: String,

    /// Role names granted to the subject.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix seconds).
    pub exp: i64,
}

impl Claims {
    /// Build claims for a fresh token valid for `validity` from now.
    pub fn new(subject: impl Into<String>, roles: Vec<String>, validity: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.into(),
            roles,
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
        }
    }

    /// Check whether the subject carries the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
