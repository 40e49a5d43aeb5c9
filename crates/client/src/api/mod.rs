// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed command façade over [`read`](crate::read) and [`exec`](crate::exec).

mod read;
mod types;
mod write;

pub use read::ReadApi;
pub use types::{
    CommandResponse, LedSettings, MinerStatus, NetworkSettings, Pool, PowerMode, Reply,
    StatusResponse, VersionInfo, VersionResponse,
};
pub use write::WriteApi;

use crate::error::Error;
use crate::session::Session;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wm_core::{Clock, Endpoint, SystemClock};
use wm_wire::JsonObject;

/// One miner: a session plus read and write views over it.
pub struct Miner<C: Clock = SystemClock> {
    session: Session<C>,
}

impl Miner<SystemClock> {
    /// Connect with default timings. Without a password only reads work.
    pub async fn connect(endpoint: Endpoint, admin_password: Option<&str>) -> Result<Self, Error> {
        Ok(Self::new(Session::connect(endpoint, admin_password).await?))
    }
}

impl<C: Clock> Miner<C> {
    pub fn new(session: Session<C>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn read(&self) -> ReadApi<'_, C> {
        ReadApi::new(&self.session)
    }

    pub fn write(&self) -> WriteApi<'_, C> {
        WriteApi::new(&self.session)
    }

    pub fn close(&self) {
        self.session.close();
    }
}

/// Decode a parsed reply into a typed response.
fn decode<T: DeserializeOwned>(cmd: &str, reply: JsonObject) -> Result<T, Error> {
    serde_json::from_value(Value::Object(reply))
        .map_err(|e| Error::BadResponse(format!("{cmd} reply: {e}")))
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
