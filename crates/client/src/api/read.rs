// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only queries.

use super::decode;
use super::types::{CommandResponse, StatusResponse, VersionResponse};
use crate::dispatch;
use crate::error::Error;
use crate::session::Session;
use wm_core::Clock;
use wm_wire::JsonObject;

/// Read-only commands. Work on every session, with or without a password.
pub struct ReadApi<'a, C: Clock> {
    session: &'a Session<C>,
}

impl<'a, C: Clock> ReadApi<'a, C> {
    pub(super) fn new(session: &'a Session<C>) -> Self {
        Self { session }
    }

    /// Any read command by name.
    pub async fn raw(&self, cmd: &str, params: Option<JsonObject>) -> Result<JsonObject, Error> {
        dispatch::read(self.session, cmd, params).await
    }

    /// Hash rates, temperatures, power and fan data.
    pub async fn summary(&self) -> Result<JsonObject, Error> {
        self.raw("summary", None).await
    }

    pub async fn pools(&self) -> Result<JsonObject, Error> {
        self.raw("pools", None).await
    }

    /// Per-hashboard statistics.
    pub async fn edevs(&self) -> Result<JsonObject, Error> {
        self.raw("edevs", None).await
    }

    pub async fn devdetails(&self) -> Result<JsonObject, Error> {
        self.raw("devdetails", None).await
    }

    /// Power supply details.
    pub async fn psu(&self) -> Result<JsonObject, Error> {
        self.raw("get_psu", None).await
    }

    pub async fn version(&self) -> Result<VersionResponse, Error> {
        decode("get_version", self.raw("get_version", None).await?)
    }

    pub async fn status(&self) -> Result<StatusResponse, Error> {
        decode("status", self.raw("status", None).await?)
    }

    pub async fn error_code(&self) -> Result<CommandResponse, Error> {
        decode("get_error_code", self.raw("get_error_code", None).await?)
    }
}
