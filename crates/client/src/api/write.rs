// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated commands.
//!
//! Numeric arguments are clamped to the range the firmware accepts rather
//! than rejected.

use super::decode;
use super::types::{CommandResponse, LedSettings, NetworkSettings, Pool, PowerMode};
use crate::dispatch;
use crate::error::Error;
use crate::session::Session;
use serde_json::Value;
use wm_core::Clock;
use wm_wire::JsonObject;

/// Most pools a miner accepts in one `update_pools`.
pub const MAX_POOLS: usize = 3;

/// Commands that require an admin password on the session.
pub struct WriteApi<'a, C: Clock> {
    session: &'a Session<C>,
}

fn params<const N: usize>(pairs: [(&str, Value); N]) -> Option<JsonObject> {
    Some(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn flag(on: bool) -> Value {
    Value::from(if on { "1" } else { "0" })
}

impl<'a, C: Clock> WriteApi<'a, C> {
    pub(super) fn new(session: &'a Session<C>) -> Self {
        Self { session }
    }

    /// Any authenticated command by name, decoded as a [`CommandResponse`].
    pub async fn raw(&self, cmd: &str, params: Option<JsonObject>) -> Result<CommandResponse, Error> {
        decode(cmd, dispatch::exec(self.session, cmd, params).await?)
    }

    /// Replace the pool list with 1 to 3 pools, in priority order.
    pub async fn update_pools(&self, pools: &[Pool]) -> Result<CommandResponse, Error> {
        if pools.is_empty() || pools.len() > MAX_POOLS {
            return Err(Error::InvalidArgument(format!(
                "expected 1 to {MAX_POOLS} pools, got {}",
                pools.len()
            )));
        }
        let mut args = JsonObject::new();
        for (i, pool) in pools.iter().enumerate() {
            let n = i + 1;
            if pool.url.is_empty() || pool.worker.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "pool {n}: url and worker must not be empty"
                )));
            }
            args.insert(format!("pool{n}"), Value::from(pool.url.as_str()));
            args.insert(format!("worker{n}"), Value::from(pool.worker.as_str()));
            args.insert(format!("passwd{n}"), Value::from(pool.password.as_str()));
        }
        self.raw("update_pools", Some(args)).await
    }

    pub async fn restart_btminer(&self) -> Result<CommandResponse, Error> {
        self.raw("restart_btminer", None).await
    }

    /// Stop hashing; the control board stays up.
    pub async fn power_off(&self) -> Result<CommandResponse, Error> {
        self.raw("power_off", None).await
    }

    pub async fn power_on(&self) -> Result<CommandResponse, Error> {
        self.raw("power_on", None).await
    }

    /// Hand the LEDs back to a firmware-managed `mode` (`"auto"` on current
    /// firmware).
    pub async fn set_led_mode(&self, mode: &str) -> Result<CommandResponse, Error> {
        if mode.is_empty() {
            return Err(Error::InvalidArgument("LED mode must not be empty".into()));
        }
        self.raw("set_led", params([("param", Value::from(mode))])).await
    }

    /// Return the LEDs to firmware control.
    pub async fn set_led_auto(&self) -> Result<CommandResponse, Error> {
        self.set_led_mode("auto").await
    }

    pub async fn set_led_custom(&self, led: &LedSettings) -> Result<CommandResponse, Error> {
        let args = params([
            ("color", Value::from(led.color.as_str())),
            ("period", Value::from(led.period)),
            ("duration", Value::from(led.duration)),
            ("start", Value::from(led.start)),
        ]);
        self.raw("set_led", args).await
    }

    pub async fn set_power_mode(&self, mode: PowerMode) -> Result<CommandResponse, Error> {
        self.raw(mode.command(), None).await
    }

    pub async fn reboot(&self) -> Result<CommandResponse, Error> {
        self.raw("reboot", None).await
    }

    pub async fn factory_reset(&self) -> Result<CommandResponse, Error> {
        self.raw("factory_reset", None).await
    }

    /// Change the admin password. The session keeps using the old one until
    /// [`Session::enable_write_access`] is called with the new password.
    pub async fn update_password(&self, old: &str, new: &str) -> Result<CommandResponse, Error> {
        self.raw("update_pwd", params([("old", Value::from(old)), ("new", Value::from(new))])).await
    }

    pub async fn set_network_dhcp(&self) -> Result<CommandResponse, Error> {
        self.raw("net_config", params([("param", Value::from("dhcp"))])).await
    }

    pub async fn set_network_static(&self, net: &NetworkSettings) -> Result<CommandResponse, Error> {
        let args = params([
            ("ip", Value::from(net.ip.as_str())),
            ("mask", Value::from(net.mask.as_str())),
            ("gate", Value::from(net.gate.as_str())),
            ("dns", Value::from(net.dns.as_str())),
            ("host", Value::from(net.host.as_str())),
        ]);
        self.raw("net_config", args).await
    }

    /// Frequency offset in percent, clamped to -100..=100.
    pub async fn set_target_freq(&self, percent: i32) -> Result<CommandResponse, Error> {
        let percent = percent.clamp(-100, 100);
        self.raw("set_target_freq", params([("percent", Value::from(percent))])).await
    }

    pub async fn enable_fast_boot(&self) -> Result<CommandResponse, Error> {
        self.raw("enable_btminer_fast_boot", None).await
    }

    pub async fn disable_fast_boot(&self) -> Result<CommandResponse, Error> {
        self.raw("disable_btminer_fast_boot", None).await
    }

    pub async fn enable_web_pools(&self) -> Result<CommandResponse, Error> {
        self.raw("enable_web_pools", None).await
    }

    pub async fn disable_web_pools(&self) -> Result<CommandResponse, Error> {
        self.raw("disable_web_pools", None).await
    }

    pub async fn set_hostname(&self, hostname: &str) -> Result<CommandResponse, Error> {
        self.raw("set_hostname", params([("hostname", Value::from(hostname))])).await
    }

    /// Power percentage, clamped to 0..=100 and sent as a string.
    pub async fn set_power_pct(&self, percent: i32) -> Result<CommandResponse, Error> {
        let percent = percent.clamp(0, 100).to_string();
        self.raw("set_power_pct", params([("percent", Value::from(percent))])).await
    }

    pub async fn set_power_pct_v2(&self, percent: i32) -> Result<CommandResponse, Error> {
        let percent = percent.clamp(0, 100).to_string();
        self.raw("set_power_pct_v2", params([("percent", Value::from(percent))])).await
    }

    /// Temperature offset, clamped to -30..=0.
    pub async fn set_temp_offset(&self, offset: i32) -> Result<CommandResponse, Error> {
        let offset = offset.clamp(-30, 0).to_string();
        self.raw("set_temp_offset", params([("temp_offset", Value::from(offset))])).await
    }

    /// Power limit in watts, clamped to 0..=99999.
    pub async fn adjust_power_limit(&self, watts: i64) -> Result<CommandResponse, Error> {
        let watts = watts.clamp(0, 99_999).to_string();
        self.raw("adjust_power_limit", params([("power_limit", Value::from(watts))])).await
    }

    /// Upfreq speed, clamped to 0..=9.
    pub async fn adjust_upfreq_speed(&self, speed: i32) -> Result<CommandResponse, Error> {
        let speed = speed.clamp(0, 9).to_string();
        self.raw("adjust_upfreq_speed", params([("upfreq_speed", Value::from(speed))])).await
    }

    pub async fn set_poweroff_cool(&self, cool: bool) -> Result<CommandResponse, Error> {
        self.raw("set_poweroff_cool", params([("poweroff_cool", flag(cool))])).await
    }

    pub async fn set_fan_zero_speed(&self, zero: bool) -> Result<CommandResponse, Error> {
        self.raw("set_fan_zero_speed", params([("fan_zero_speed", flag(zero))])).await
    }

    pub async fn enable_btminer_init(&self) -> Result<CommandResponse, Error> {
        self.raw("enable_btminer_init", None).await
    }

    pub async fn disable_btminer_init(&self) -> Result<CommandResponse, Error> {
        self.raw("disable_btminer_init", None).await
    }
}
