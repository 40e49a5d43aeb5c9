// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command dispatch: plaintext reads and authenticated writes.

use crate::error::Error;
use crate::session::Session;
use serde_json::Value;
use wm_core::Clock;
use wm_wire::{command, decode_reply, encode_line, error_status, open, seal, JsonObject};

/// Send a read-only command and return the sanitized, parsed reply.
///
/// Needs no credentials and takes no lock.
pub async fn read<C: Clock>(
    session: &Session<C>,
    cmd: &str,
    params: Option<JsonObject>,
) -> Result<JsonObject, Error> {
    let request = encode_line(&command(cmd, None, params))?;
    let raw = session.transport().exchange(session.endpoint(), &request).await?;
    tracing::debug!(endpoint = %session.endpoint(), cmd, "read reply");
    Ok(decode_reply(&raw)?)
}

/// Send an authenticated command and return the decrypted reply.
///
/// Holds the session mutex from the freshness check until the reply is
/// decrypted, so the key and sign used are one consistent pair and
/// authenticated commands on a session never overlap.
pub async fn exec<C: Clock>(
    session: &Session<C>,
    cmd: &str,
    params: Option<JsonObject>,
) -> Result<JsonObject, Error> {
    let state = session.write_guard().await?;
    let credentials = state.credentials().ok_or(Error::NotInitialized)?;

    let request = seal(credentials.cipher(), &command(cmd, Some(credentials.sign()), params))?;
    let raw = session.transport().exchange(session.endpoint(), &request).await?;

    let envelope = decode_reply(&raw)?;
    if let Some(msg) = error_status(&envelope) {
        tracing::debug!(endpoint = %session.endpoint(), cmd, %msg, "miner rejected command");
        return Err(Error::PeerError { msg });
    }
    let Some(enc) = envelope.get("enc").and_then(Value::as_str) else {
        return Err(Error::BadCiphertext("reply has no enc payload".into()));
    };
    let reply = open(credentials.cipher(), enc)?;
    tracing::debug!(endpoint = %session.endpoint(), cmd, "exec reply");
    Ok(reply)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
