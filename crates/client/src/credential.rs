// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key derivation from the admin password and a server token record.
//!
//! ```text
//! derived    = md5_crypt(password, "$1$" + salt + "$")[3rd '$' field]
//! cipher key = SHA-256(derived)
//! sign       = md5_crypt(derived + time, "$1$" + newsalt + "$")[3rd '$' field]
//! ```

use crate::md5_crypt;
use regex::Regex;
use serde::Deserialize;
use serde_json::Number;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use wm_wire::{MinerCipher, WireError};

/// Shape an MD5-crypt salt string must have.
#[allow(clippy::expect_used)]
static SALT_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\$[0-9]+\$[0-9A-Za-z_./]*\$").expect("constant regex pattern is valid")
});

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("salt format is not correct: {0:?}")]
    BadSalt(String),

    #[error("malformed token record: {0}")]
    MalformedToken(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("failed to create cipher: {0}")]
    Cipher(#[source] WireError),
}

/// Nonces from a `get_token` reply (`Msg` object).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenInfo {
    pub salt: String,
    pub newsalt: String,
    pub time: Number,
}

/// Cipher key and sign from one derivation. Always replaced as a pair.
#[derive(Clone)]
pub struct Credentials {
    key: [u8; 32],
    cipher: MinerCipher,
    sign: String,
}

impl Credentials {
    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn cipher(&self) -> &MinerCipher {
        &self.cipher
    }

    pub fn sign(&self) -> &str {
        &self.sign
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("cipher", &self.cipher).finish_non_exhaustive()
    }
}

/// Derive the session key and sign for `password` from a token record.
pub fn derive(password: &str, token: &TokenInfo) -> Result<Credentials, CredentialError> {
    let full_salt = format!("$1${}$", token.salt);
    if !SALT_SHAPE.is_match(&full_salt) {
        return Err(CredentialError::BadSalt(full_salt));
    }
    let derived = crypt_field(password.as_bytes(), &full_salt)?;

    let key: [u8; 32] = Sha256::digest(derived.as_bytes()).into();
    let cipher = MinerCipher::new(&key).map_err(CredentialError::Cipher)?;

    let full_new_salt = format!("$1${}$", token.newsalt);
    let signed = format!("{derived}{}", time_string(&token.time));
    let sign = crypt_field(signed.as_bytes(), &full_new_salt)?;

    Ok(Credentials { key, cipher, sign })
}

/// MD5-crypt `input` and return the hash field after the salt.
fn crypt_field(input: &[u8], setting: &str) -> Result<String, CredentialError> {
    let salt = md5_crypt::salt_of(setting)
        .ok_or_else(|| CredentialError::Hash(format!("not an MD5-crypt setting: {setting:?}")))?;
    Ok(md5_crypt::hash_field(input, salt))
}

/// Decimal form of the token time: integers without fraction or exponent.
fn time_string(time: &Number) -> String {
    if let Some(n) = time.as_u64() {
        return n.to_string();
    }
    if let Some(n) = time.as_i64() {
        return n.to_string();
    }
    match time.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
        Some(f) => format!("{f}"),
        None => time.to_string(),
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
