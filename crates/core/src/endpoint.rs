// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Network address of a single miner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// TCP port the miner's management API listens on by default.
pub const DEFAULT_API_PORT: u16 = 4028;

/// `(host, port)` pair identifying one miner.
///
/// Displays in `host:port` form, bracketing IPv6 literals the way a socket
/// address expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    host: String,
    port: u16,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointParseError {
    #[error("empty host in endpoint '{0}'")]
    EmptyHost(String),
    #[error("invalid port in endpoint '{0}'")]
    InvalidPort(String),
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    /// Parse `host`, `host:port` or `[v6]:port`. A bare host gets
    /// [`DEFAULT_API_PORT`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) =
                rest.split_once(']').ok_or_else(|| EndpointParseError::InvalidPort(s.into()))?;
            match tail.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None if tail.is_empty() => (host, None),
                None => return Err(EndpointParseError::InvalidPort(s.into())),
            }
        } else if s.matches(':').count() == 1 {
            let (host, port) = s.split_once(':').unwrap_or((s, ""));
            (host, Some(port))
        } else {
            // bare hostname, IPv4 or unbracketed IPv6 literal
            (s, None)
        };

        if host.is_empty() {
            return Err(EndpointParseError::EmptyHost(s.into()));
        }
        let port = match port {
            Some(p) => p.parse().map_err(|_| EndpointParseError::InvalidPort(s.into()))?,
            None => DEFAULT_API_PORT,
        };
        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
