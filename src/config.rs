// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `COREBANK_DATA_DIR` | Directory holding the ledger database file | `./data` |
//! | `JWT_SECRET` | Comma-separated token secrets, first one signs | Ephemeral key |
//! | `JWT_VALIDITY_SECS` | Token lifetime in seconds | `86400` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;

use chrono::Duration;
use tracing::warn;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "COREBANK_DATA_DIR";

/// Environment variable carrying the token secret list.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable overriding the token lifetime.
pub const JWT_VALIDITY_ENV: &str = "JWT_VALIDITY_SECS";

/// Default token lifetime: one day.
pub const DEFAULT_JWT_VALIDITY_SECS: i64 = 86_400;

/// File name of the ledger database inside the data directory.
pub const DATABASE_FILE: &str = "corebank.redb";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the ledger database.
    pub data_dir: PathBuf,
    /// Comma-separated token secrets; `None` when unset or blank, which
    /// makes the key store fall back to an ephemeral key.
    pub jwt_secret: Option<String>,
    /// Lifetime of newly issued tokens.
    pub jwt_validity: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let jwt_secret = std::env::var(JWT_SECRET_ENV)
            .ok()
            .filter(|raw| !raw.trim().is_empty());

        let jwt_validity_secs = match std::env::var(JWT_VALIDITY_ENV) {
            Ok(raw) => raw.parse::<i64>().ok().filter(|secs| *secs > 0).unwrap_or_else(|| {
                warn!(value = %raw, "Ignoring invalid {JWT_VALIDITY_ENV}, using the default");
                DEFAULT_JWT_VALIDITY_SECS
            }),
            Err(_) => DEFAULT_JWT_VALIDITY_SECS,
        };

        Self {
            data_dir,
            jwt_secret,
            jwt_validity: Duration::seconds(jwt_validity_secs),
        }
    }

    /// Full path of the ledger database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            jwt_secret: None,
            jwt_validity: Duration::seconds(DEFAULT_JWT_VALIDITY_SECS),
        }
    }
}
