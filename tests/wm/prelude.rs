// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for scenario tests.

use std::sync::Once;

pub use serde_json::json;
pub use std::time::{Duration, Instant};
pub use wm_client::{Endpoint, Error, FakeMiner, Miner, Session, SessionBuilder};
pub use wm_core::{Clock, FakeClock};

pub const PASSWORD: &str = "admin";

/// Route client logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wm_client=debug,wm_wire=debug"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Start `miner` on a loopback port.
pub async fn serve(miner: &FakeMiner) -> Endpoint {
    init_tracing();
    miner.serve_tcp().await.expect("bind fake miner")
}
