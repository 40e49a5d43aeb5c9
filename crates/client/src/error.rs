// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client error taxonomy.

use crate::credential::CredentialError;
use thiserror::Error;
use wm_wire::WireError;

/// Errors returned by sessions and commands.
#[derive(Debug, Error)]
pub enum Error {
    /// Connect, write or read failed.
    #[error("transport error: {0}")]
    Transport(#[source] WireError),

    /// The miner refused a token request ("over max connect").
    #[error("miner is busy: over max connect")]
    PeerBusy,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("no admin password configured; session is read-only")]
    NoCredentials,

    #[error("session key not initialized")]
    NotInitialized,

    #[error("bad ciphertext: {0}")]
    BadCiphertext(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    /// Plaintext `STATUS: "E"` reply to an authenticated command.
    #[error("miner API error: {msg}")]
    PeerError { msg: String },

    /// Background refresh failure, delivered to the refresh error sink only.
    #[error("background token refresh failed: {0}")]
    RefreshFailed(#[source] Box<Error>),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<WireError> for Error {
    fn from(err: WireError) -> Self {
        match err {
            WireError::BadCiphertext(msg) => Error::BadCiphertext(msg),
            WireError::UnalignedPlaintext(_) | WireError::InvalidKeyLength(_) => {
                Error::BadCiphertext(err.to_string())
            }
            WireError::BadResponse(e) | WireError::Encode(e) => Error::BadResponse(e.to_string()),
            WireError::Connect { .. } | WireError::ConnectTimeout { .. } | WireError::Io { .. } => {
                Error::Transport(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
