// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON frames exchanged with the miner.

use crate::cipher::MinerCipher;
use crate::codec::{pad16, sanitize, strip_padding, trim_nul};
use crate::error::WireError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Value};

/// A JSON object: command parameters, frames, and parsed replies.
pub type JsonObject = Map<String, Value>;

/// Token request, sent verbatim.
pub const GET_TOKEN: &[u8] = br#"{"cmd": "get_token"}"#;

/// Build `{"cmd": cmd, "token": token, ..params}`.
///
/// Parameters are merged last and may override either key.
pub fn command(cmd: &str, token: Option<&str>, params: Option<JsonObject>) -> JsonObject {
    let mut frame = JsonObject::new();
    frame.insert("cmd".into(), Value::from(cmd));
    if let Some(token) = token {
        frame.insert("token".into(), Value::from(token));
    }
    if let Some(params) = params {
        frame.extend(params);
    }
    frame
}

/// Serialize a frame as one newline-terminated JSON line.
pub fn encode_line(frame: &JsonObject) -> Result<Vec<u8>, WireError> {
    let mut bytes = serde_json::to_vec(frame).map_err(WireError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Encrypt a plaintext command into the `{"enc": 1, "data": ..}` envelope.
pub fn seal(cipher: &MinerCipher, plaintext: &JsonObject) -> Result<Vec<u8>, WireError> {
    let plain = serde_json::to_vec(plaintext).map_err(WireError::Encode)?;
    let ciphertext = cipher.encrypt(&pad16(plain))?;
    let data = BASE64.encode(ciphertext).replace('\n', "");

    let mut envelope = JsonObject::new();
    envelope.insert("enc".into(), Value::from(1));
    envelope.insert("data".into(), Value::from(data));
    encode_line(&envelope)
}

/// Sanitize and parse a plaintext reply.
pub fn decode_reply(raw: &[u8]) -> Result<JsonObject, WireError> {
    let text = String::from_utf8_lossy(raw);
    serde_json::from_str(&sanitize(&text)).map_err(WireError::BadResponse)
}

/// Decrypt the `enc` payload of an authenticated reply and parse it.
pub fn open(cipher: &MinerCipher, enc: &str) -> Result<JsonObject, WireError> {
    let enc: String = enc.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    let ciphertext =
        BASE64.decode(enc).map_err(|e| WireError::BadCiphertext(format!("base64: {e}")))?;
    let plaintext = cipher.decrypt(&ciphertext)?;
    let body = trim_nul(strip_padding(&plaintext));
    serde_json::from_slice(body).map_err(WireError::BadResponse)
}

/// Message of a plaintext `STATUS: "E"` reply, if this is one.
pub fn error_status(reply: &JsonObject) -> Option<String> {
    if reply.get("STATUS").and_then(Value::as_str) != Some("E") {
        return None;
    }
    Some(match reply.get("Msg") {
        Some(Value::String(msg)) => msg.clone(),
        Some(other) => other.to_string(),
        None => "unknown miner error".to_string(),
    })
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
