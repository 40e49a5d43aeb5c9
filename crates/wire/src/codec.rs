// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Byte-level helpers: sanitization and block padding.
//!
//! Padding is asymmetric. Requests are zero-padded; replies are stripped by
//! reading the final byte as a pad count and then cut at the first NUL, which
//! accepts both PKCS-style and zero-padded replies.

use crate::cipher::BLOCK_SIZE;

/// Rewrite the bare `inf` / `nan` literals the miner emits into numbers.
///
/// Purely textual: a string field containing either substring is rewritten too.
pub fn sanitize(text: &str) -> String {
    text.replace("inf", "999").replace("nan", "0")
}

/// Zero-pad to a multiple of [`BLOCK_SIZE`]. Aligned input is returned as is.
pub fn pad16(mut bytes: Vec<u8>) -> Vec<u8> {
    let rem = bytes.len() % BLOCK_SIZE;
    if rem != 0 {
        bytes.resize(bytes.len() + BLOCK_SIZE - rem, 0);
    }
    bytes
}

/// Drop as many trailing bytes as the final byte claims.
///
/// A claim longer than the buffer yields an empty slice.
pub fn strip_padding(bytes: &[u8]) -> &[u8] {
    let Some(&last) = bytes.last() else {
        return &[];
    };
    let pad = usize::from(last);
    if pad > bytes.len() {
        return &[];
    }
    &bytes[..bytes.len() - pad]
}

/// Cut at the first NUL byte.
pub fn trim_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
