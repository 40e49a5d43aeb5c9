// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wm-client: authenticated sessions and commands for miner management APIs.
//!
//! ```no_run
//! # async fn demo() -> Result<(), wm_client::Error> {
//! use wm_client::{Endpoint, Miner};
//!
//! let miner = Miner::connect(Endpoint::new("10.0.0.12", 4028), Some("admin")).await?;
//! let summary = miner.read().summary().await?;
//! miner.write().power_off().await?;
//! # let _ = summary;
//! # Ok(())
//! # }
//! ```

pub mod api;
mod config;
pub mod credential;
mod dispatch;
mod error;
mod md5_crypt;
mod session;

#[cfg(any(test, feature = "test-support"))]
mod fake_miner;

pub use api::{Miner, ReadApi, WriteApi};
pub use config::{SessionConfig, DEFAULT_MAX_TOKEN_AGE, DEFAULT_REFRESH_INTERVAL};
pub use credential::{CredentialError, Credentials, TokenInfo};
pub use dispatch::{exec, read};
pub use error::Error;
pub use session::{RefreshErrorSink, Session, SessionBuilder};
pub use wm_core::Endpoint;

#[cfg(any(test, feature = "test-support"))]
pub use fake_miner::{ExecCall, FakeMiner, FAKE_NEWSALT, FAKE_SALT, FAKE_TIME};
#[cfg(any(test, feature = "test-support"))]
pub use session::SessionSnapshot;
