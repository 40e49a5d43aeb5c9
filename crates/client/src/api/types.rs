// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed replies and command arguments.

use serde::Deserialize;
use serde_json::Value;

/// Envelope shared by command replies: `{STATUS, When, Code, Msg, Description}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reply<M> {
    #[serde(rename = "STATUS", default)]
    pub status: String,
    #[serde(rename = "When", default)]
    pub when: i64,
    #[serde(rename = "Code", default)]
    pub code: i64,
    #[serde(rename = "Msg", default)]
    pub msg: M,
    #[serde(rename = "Description", default)]
    pub description: String,
}

impl<M> Reply<M> {
    /// `STATUS` is `"S"`.
    pub fn is_success(&self) -> bool {
        self.status == "S"
    }
}

/// Reply to a write command or `get_error_code`; `Msg` is left untyped.
pub type CommandResponse = Reply<Value>;

/// Reply to `get_version`.
pub type VersionResponse = Reply<VersionInfo>;

/// Reply to `status`.
pub type StatusResponse = Reply<MinerStatus>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VersionInfo {
    pub api_ver: String,
    pub fw_ver: String,
    pub platform: String,
    pub chip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MinerStatus {
    pub btmineroff: String,
    #[serde(rename = "Firmware Version")]
    pub firmware_version: String,
    pub power_mode: String,
    pub power_limit_set: String,
    pub hash_percent: String,
}

/// One mining pool for `update_pools`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pool {
    pub url: String,
    pub worker: String,
    pub password: String,
}

impl Pool {
    pub fn new(url: impl Into<String>, worker: impl Into<String>, password: impl Into<String>) -> Self {
        Self { url: url.into(), worker: worker.into(), password: password.into() }
    }
}

/// Custom LED blink pattern for `set_led`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedSettings {
    pub color: String,
    pub period: u32,
    pub duration: u32,
    pub start: u32,
}

/// Static network configuration for `net_config`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSettings {
    pub ip: String,
    pub mask: String,
    pub gate: String,
    pub dns: String,
    pub host: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Low,
    Normal,
    High,
}

impl PowerMode {
    /// Command that switches the miner into this mode.
    pub fn command(self) -> &'static str {
        match self {
            PowerMode::Low => "set_low_power",
            PowerMode::Normal => "set_normal_power",
            PowerMode::High => "set_high_power",
        }
    }
}
