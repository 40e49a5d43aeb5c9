// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/reply exchange with a miner.
//!
//! The [`Transport`] trait abstracts the exchange so sessions can run over
//! TCP (production) or an in-memory emulator (tests).

use crate::error::WireError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use wm_core::Endpoint;

/// Connect timeout used unless configured otherwise.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One request, one reply, over a fresh connection.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return everything the miner writes back.
    async fn exchange(&self, endpoint: &Endpoint, request: &[u8]) -> Result<Vec<u8>, WireError>;
}

/// Fresh TCP connection per exchange; no keep-alive.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    connect_timeout: Duration,
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn exchange(&self, endpoint: &Endpoint, request: &[u8]) -> Result<Vec<u8>, WireError> {
        let addr = endpoint.to_string();
        let mut stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| WireError::ConnectTimeout {
                endpoint: endpoint.clone(),
                timeout: self.connect_timeout,
            })?
            .map_err(|source| WireError::Connect { endpoint: endpoint.clone(), source })?;

        stream.write_all(request).await.map_err(|source| WireError::Io { op: "write", source })?;
        // The miner answers once the client stops writing
        stream.shutdown().await.map_err(|source| WireError::Io { op: "shutdown", source })?;

        let mut reply = Vec::new();
        stream
            .read_to_end(&mut reply)
            .await
            .map_err(|source| WireError::Io { op: "read", source })?;

        tracing::debug!(%endpoint, sent = request.len(), received = reply.len(), "miner exchange");
        Ok(reply)
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
