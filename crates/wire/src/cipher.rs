// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AES in ECB mode, as the miner's wire format requires.
//!
//! The key width is taken from the key itself: 16, 24 or 32 bytes select
//! AES-128, AES-192 or AES-256. The block is always 16 bytes.

use crate::error::WireError;
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use std::fmt;

/// AES block size in bytes, independent of key width.
pub const BLOCK_SIZE: usize = 16;

/// Block cipher keyed from session key material.
#[derive(Clone)]
pub struct MinerCipher {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl MinerCipher {
    pub fn new(key: &[u8]) -> Result<Self, WireError> {
        let bad_len = |_| WireError::InvalidKeyLength(key.len());
        let inner = match key.len() {
            16 => Inner::Aes128(Aes128::new_from_slice(key).map_err(bad_len)?),
            24 => Inner::Aes192(Aes192::new_from_slice(key).map_err(bad_len)?),
            32 => Inner::Aes256(Aes256::new_from_slice(key).map_err(bad_len)?),
            n => return Err(WireError::InvalidKeyLength(n)),
        };
        Ok(Self { inner })
    }

    pub fn key_bits(&self) -> usize {
        match self.inner {
            Inner::Aes128(_) => 128,
            Inner::Aes192(_) => 192,
            Inner::Aes256(_) => 256,
        }
    }

    /// Encrypt block-aligned plaintext. Callers pad first.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, WireError> {
        if plaintext.is_empty() || plaintext.len() % BLOCK_SIZE != 0 {
            return Err(WireError::UnalignedPlaintext(plaintext.len()));
        }
        let mut buf = plaintext.to_vec();
        for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            match &self.inner {
                Inner::Aes128(c) => c.encrypt_block(block),
                Inner::Aes192(c) => c.encrypt_block(block),
                Inner::Aes256(c) => c.encrypt_block(block),
            }
        }
        Ok(buf)
    }

    /// Decrypt a ciphertext whose length is a positive multiple of the block.
    ///
    /// Padding is left in place; see [`crate::strip_padding`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, WireError> {
        if ciphertext.len() < BLOCK_SIZE {
            return Err(WireError::BadCiphertext(format!(
                "ciphertext is too short ({} bytes)",
                ciphertext.len()
            )));
        }
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(WireError::BadCiphertext(format!(
                "ciphertext length {} is not a multiple of the block size",
                ciphertext.len()
            )));
        }
        let mut buf = ciphertext.to_vec();
        for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            match &self.inner {
                Inner::Aes128(c) => c.decrypt_block(block),
                Inner::Aes192(c) => c.decrypt_block(block),
                Inner::Aes256(c) => c.decrypt_block(block),
            }
        }
        Ok(buf)
    }
}

impl fmt::Debug for MinerCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinerCipher").field("key_bits", &self.key_bits()).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "cipher_tests.rs"]
mod tests;
