// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MD5-crypt (`$1$`), as produced by glibc `crypt(3)` and `openssl passwd -1`.
//!
//! Salt bytes are hashed as given: any byte other than `$` is accepted and
//! the salt is cut at 8 bytes.

use md5::{Digest, Md5};

const MAGIC: &str = "$1$";
const MAX_SALT_LEN: usize = 8;
const ITOA64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Digest byte triples in output order; the final byte is encoded alone.
const GROUPS: [(usize, usize, usize); 5] = [(0, 6, 12), (1, 7, 13), (2, 8, 14), (3, 9, 15), (4, 10, 5)];

/// Salt taken from a `$1$<salt>[$...]` setting, or `None` for another scheme.
pub(crate) fn salt_of(setting: &str) -> Option<&[u8]> {
    let rest = setting.strip_prefix(MAGIC)?.as_bytes();
    let end = rest.iter().position(|&b| b == b'$').unwrap_or(rest.len());
    Some(&rest[..end.min(MAX_SALT_LEN)])
}

/// The 22-character hash field for `password` under `salt`.
pub(crate) fn hash_field(password: &[u8], salt: &[u8]) -> String {
    let alternate = Md5::new().chain_update(password).chain_update(salt).chain_update(password).finalize();

    let mut ctx = Md5::new().chain_update(password).chain_update(MAGIC).chain_update(salt);
    let mut remaining = password.len();
    while remaining > 0 {
        let n = remaining.min(alternate.len());
        ctx.update(&alternate[..n]);
        remaining -= n;
    }
    let mut bits = password.len();
    while bits > 0 {
        if bits & 1 == 1 {
            ctx.update([0u8]);
        } else {
            ctx.update(&password[..1]);
        }
        bits >>= 1;
    }
    let mut digest = ctx.finalize();

    for round in 0..1000 {
        let mut ctx = Md5::new();
        if round & 1 == 1 {
            ctx.update(password);
        } else {
            ctx.update(digest);
        }
        if round % 3 != 0 {
            ctx.update(salt);
        }
        if round % 7 != 0 {
            ctx.update(password);
        }
        if round & 1 == 1 {
            ctx.update(digest);
        } else {
            ctx.update(password);
        }
        digest = ctx.finalize();
    }

    let mut out = String::with_capacity(22);
    for (a, b, c) in GROUPS {
        let v = (u32::from(digest[a]) << 16) | (u32::from(digest[b]) << 8) | u32::from(digest[c]);
        push_base64(&mut out, v, 4);
    }
    push_base64(&mut out, u32::from(digest[11]), 2);
    out
}

fn push_base64(out: &mut String, mut value: u32, count: usize) {
    for _ in 0..count {
        out.push(char::from(ITOA64[(value & 0x3f) as usize]));
        value >>= 6;
    }
}

#[cfg(test)]
#[path = "md5_crypt_tests.rs"]
mod tests;
