// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire codec for the miner management API.
//!
//! One TCP connection per command. The client writes a single JSON object,
//! half-closes, and reads until the miner closes. Privileged commands travel
//! as `{"enc": 1, "data": <base64(AES-ECB(pad16(json)))>}`; their replies come
//! back as `{"enc": <base64>}` or as a plaintext `STATUS: "E"` error.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cipher;
mod codec;
mod error;
mod frame;
mod transport;

pub use cipher::{MinerCipher, BLOCK_SIZE};
pub use codec::{pad16, sanitize, strip_padding, trim_nul};
pub use error::WireError;
pub use frame::{command, decode_reply, encode_line, error_status, open, seal, JsonObject, GET_TOKEN};
pub use transport::{TcpTransport, Transport, DEFAULT_CONNECT_TIMEOUT};
