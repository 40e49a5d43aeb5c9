// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session timing configuration.
//!
//! Callers embed [`SessionConfig`] in their own configuration files; durations
//! are written as integer seconds.

use crate::error::Error;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use wm_wire::DEFAULT_CONNECT_TIMEOUT;

/// Background refresh schedule.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(25 * 60);

/// Age past which an authenticated command rederives synchronously.
pub const DEFAULT_MAX_TOKEN_AGE: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(deserialize_with = "seconds")]
    pub connect_timeout: Duration,
    #[serde(deserialize_with = "seconds")]
    pub refresh_interval: Duration,
    #[serde(deserialize_with = "seconds")]
    pub max_token_age: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            max_token_age: DEFAULT_MAX_TOKEN_AGE,
        }
    }
}

impl SessionConfig {
    /// The background refresh must fire before a command is forced to rederive.
    pub fn validate(&self) -> Result<(), Error> {
        if self.connect_timeout.is_zero() {
            return Err(Error::Config("connect_timeout must be non-zero".into()));
        }
        if self.refresh_interval >= self.max_token_age {
            return Err(Error::Config(format!(
                "refresh_interval ({:?}) must be shorter than max_token_age ({:?})",
                self.refresh_interval, self.max_token_age
            )));
        }
        Ok(())
    }
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
