// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;
use thiserror::Error;
use wm_core::Endpoint;

/// Errors from framing, encryption and the TCP exchange.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to connect to miner at {endpoint}: {source}")]
    Connect {
        endpoint: Endpoint,
        #[source]
        source: std::io::Error,
    },

    #[error("connect to miner at {endpoint} timed out after {timeout:?}")]
    ConnectTimeout { endpoint: Endpoint, timeout: Duration },

    #[error("{op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("bad ciphertext: {0}")]
    BadCiphertext(String),

    #[error("plaintext length {0} is not a multiple of the AES block size")]
    UnalignedPlaintext(usize),

    #[error("unsupported AES key length: {0} bytes")]
    InvalidKeyLength(usize),

    #[error("malformed response: {0}")]
    BadResponse(#[source] serde_json::Error),

    #[error("failed to encode command: {0}")]
    Encode(#[source] serde_json::Error),
}
