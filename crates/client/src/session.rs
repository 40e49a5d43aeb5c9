// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access token for one miner.
//!
//! A [`Session`] owns the endpoint, the optional admin password, and the key
//! material derived from it. With a password it runs one background worker
//! that rederives the key before it ages out:
//!
//! ```text
//! Idle ──► Sleeping(created_at + refresh_interval) ──► Refreshing ──► Idle
//!               │
//!               └── stop signal ──► Stopped
//! ```
//!
//! All mutable state sits behind one async mutex. Authenticated commands hold
//! it for their whole exchange, which orders them against each other and
//! against key rotation.

use crate::config::SessionConfig;
use crate::credential::{self, CredentialError, Credentials, TokenInfo};
use crate::error::Error;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::MutexGuard;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wm_core::{Clock, Endpoint, SystemClock};
use wm_wire::{TcpTransport, Transport, GET_TOKEN};

/// Token reply text when the miner has no free API slots.
const OVER_MAX_CONNECT: &str = "over max connect";

/// Receives background refresh failures (always [`Error::RefreshFailed`]).
pub type RefreshErrorSink = Arc<dyn Fn(&Error) + Send + Sync>;

/// Handle to one miner's credentials. Dropping it stops the refresh worker.
pub struct Session<C: Clock = SystemClock> {
    shared: Arc<Shared<C>>,
    stop: CancellationToken,
}

/// State shared with the refresh worker.
pub(crate) struct Shared<C: Clock> {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    clock: C,
    config: SessionConfig,
    state: tokio::sync::Mutex<WriteState>,
    sink: Mutex<Option<RefreshErrorSink>>,
}

/// Mutable session fields, guarded by the session mutex.
pub(crate) struct WriteState {
    admin_password: Option<String>,
    created_at: Instant,
    credentials: Option<Credentials>,
    worker: Option<JoinHandle<()>>,
}

impl WriteState {
    pub(crate) fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// Builder for [`Session`].
pub struct SessionBuilder<C: Clock = SystemClock> {
    endpoint: Endpoint,
    admin_password: Option<String>,
    config: SessionConfig,
    transport: Option<Arc<dyn Transport>>,
    clock: C,
    sink: Option<RefreshErrorSink>,
}

impl SessionBuilder<SystemClock> {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            admin_password: None,
            config: SessionConfig::default(),
            transport: None,
            clock: SystemClock,
            sink: None,
        }
    }
}

impl<C: Clock> SessionBuilder<C> {
    /// Admin password enabling write access. An empty password means read-only.
    pub fn admin_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.admin_password = (!password.is_empty()).then_some(password);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default [`TcpTransport`].
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn clock<C2: Clock>(self, clock: C2) -> SessionBuilder<C2> {
        SessionBuilder {
            endpoint: self.endpoint,
            admin_password: self.admin_password,
            config: self.config,
            transport: self.transport,
            clock,
            sink: self.sink,
        }
    }

    pub fn on_refresh_error(mut self, sink: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Build the session. With a password, derives the key before returning
    /// and starts the refresh worker; on failure nothing is left running.
    pub async fn connect(self) -> Result<Session<C>, Error> {
        self.config.validate()?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(TcpTransport::new(self.config.connect_timeout)),
        };
        let created_at = self.clock.now();
        let session = Session {
            shared: Arc::new(Shared {
                endpoint: self.endpoint,
                transport,
                clock: self.clock,
                config: self.config,
                state: tokio::sync::Mutex::new(WriteState {
                    admin_password: None,
                    created_at,
                    credentials: None,
                    worker: None,
                }),
                sink: Mutex::new(self.sink),
            }),
            stop: CancellationToken::new(),
        };

        if let Some(password) = self.admin_password {
            session.enable_write_access(&password).await?;
        }
        Ok(session)
    }
}

impl Session<SystemClock> {
    pub fn builder(endpoint: Endpoint) -> SessionBuilder<SystemClock> {
        SessionBuilder::new(endpoint)
    }

    /// Connect over TCP with default timings.
    pub async fn connect(endpoint: Endpoint, admin_password: Option<&str>) -> Result<Self, Error> {
        let mut builder = SessionBuilder::new(endpoint);
        if let Some(password) = admin_password {
            builder = builder.admin_password(password);
        }
        builder.connect().await
    }
}

impl<C: Clock> Session<C> {
    pub fn endpoint(&self) -> &Endpoint {
        &self.shared.endpoint
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.shared.transport.as_ref()
    }

    /// Succeeds if write access is configured, rederiving first when the key
    /// is older than `max_token_age`.
    pub async fn has_write_access(&self) -> Result<(), Error> {
        let mut state = self.shared.state.lock().await;
        self.shared.ensure_fresh(&mut state).await
    }

    /// Lock the session for an authenticated command, refreshing if overdue.
    pub(crate) async fn write_guard(&self) -> Result<MutexGuard<'_, WriteState>, Error> {
        let mut state = self.shared.state.lock().await;
        self.shared.ensure_fresh(&mut state).await?;
        Ok(state)
    }

    /// Derive write credentials for `password` and start the refresh worker
    /// if it is not already running. The password is kept only on success.
    pub async fn enable_write_access(&self, password: &str) -> Result<(), Error> {
        if password.is_empty() {
            return Err(Error::InvalidArgument("admin password must not be empty".into()));
        }
        let mut state = self.shared.state.lock().await;
        self.shared.rederive(&mut state, password).await?;
        state.admin_password = Some(password.to_string());

        if state.worker.as_ref().map_or(true, JoinHandle::is_finished) {
            state.worker =
                Some(tokio::spawn(refresh_worker(Arc::clone(&self.shared), self.stop.clone())));
        }
        Ok(())
    }

    pub fn set_refresh_error_sink(&self, sink: impl Fn(&Error) + Send + Sync + 'static) {
        *self.shared.sink.lock() = Some(Arc::new(sink));
    }

    /// Stop the refresh worker. Idempotent; an in-flight command completes.
    pub fn close(&self) {
        self.stop.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.stop.is_cancelled()
    }
}

impl<C: Clock> Drop for Session<C> {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

impl<C: Clock> Shared<C> {
    async fn ensure_fresh(&self, state: &mut WriteState) -> Result<(), Error> {
        let Some(password) = state.admin_password.clone() else {
            return Err(Error::NoCredentials);
        };
        if self.clock.since(state.created_at) > self.config.max_token_age {
            tracing::info!(endpoint = %self.endpoint, "session key expired, rederiving");
            self.rederive(state, &password).await?;
        }
        Ok(())
    }

    /// Fetch a fresh token record and install new credentials.
    ///
    /// Caller holds the session mutex. On failure the previous pair stays.
    async fn rederive(&self, state: &mut WriteState, password: &str) -> Result<(), Error> {
        let reply = self.transport.exchange(&self.endpoint, GET_TOKEN).await?;
        let token = parse_token_reply(&reply)?;
        let credentials = credential::derive(password, &token)?;

        state.credentials = Some(credentials);
        state.created_at = state.created_at.max(self.clock.now());
        tracing::info!(endpoint = %self.endpoint, "session key derived");
        Ok(())
    }

    /// Rederive unless another path already renewed the key.
    async fn refresh_if_due(&self) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        if self.clock.since(state.created_at) < self.config.refresh_interval {
            return Ok(());
        }
        let Some(password) = state.admin_password.clone() else {
            return Ok(());
        };
        self.rederive(&mut state, &password).await
    }

    fn report_refresh_failure(&self, err: Error) {
        let err = Error::RefreshFailed(Box::new(err));
        let sink = self.sink.lock().clone();
        match sink {
            Some(sink) => sink(&err),
            None => tracing::warn!(endpoint = %self.endpoint, error = %err, "token refresh failed"),
        }
    }
}

/// Background refresh loop; one per session with write access.
async fn refresh_worker<C: Clock>(shared: Arc<Shared<C>>, stop: CancellationToken) {
    tracing::debug!(endpoint = %shared.endpoint, "refresh worker started");
    let mut failed = false;
    loop {
        // After a failure, wait a full interval instead of retrying at once
        let wait = if failed {
            shared.config.refresh_interval
        } else {
            let created_at = shared.state.lock().await.created_at;
            shared.config.refresh_interval.saturating_sub(shared.clock.since(created_at))
        };

        tokio::select! {
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        failed = match shared.refresh_if_due().await {
            Ok(()) => false,
            Err(err) => {
                shared.report_refresh_failure(err);
                true
            }
        };
    }
    tracing::debug!(endpoint = %shared.endpoint, "refresh worker stopped");
}

/// Parse a `get_token` reply into its token record.
///
/// Not sanitized: salts are opaque strings.
fn parse_token_reply(raw: &[u8]) -> Result<TokenInfo, Error> {
    let reply: Value = serde_json::from_slice(raw)
        .map_err(|e| Error::BadResponse(format!("token reply: {e}")))?;
    match reply.get("Msg") {
        Some(Value::String(msg)) if msg == OVER_MAX_CONNECT => Err(Error::PeerBusy),
        Some(msg @ Value::Object(_)) => serde_json::from_value(msg.clone())
            .map_err(|e| CredentialError::MalformedToken(e.to_string()).into()),
        Some(other) => Err(CredentialError::MalformedToken(format!("unexpected Msg {other}")).into()),
        None => Err(CredentialError::MalformedToken("missing Msg".into()).into()),
    }
}

/// Credentials as seen under the session mutex.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub key: [u8; 32],
    pub sign: String,
    pub created_at: Instant,
    pub worker_running: bool,
}

#[cfg(any(test, feature = "test-support"))]
impl<C: Clock> Session<C> {
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let state = self.shared.state.lock().await;
        let credentials = state.credentials.as_ref()?;
        Some(SessionSnapshot {
            key: *credentials.key(),
            sign: credentials.sign().to_string(),
            created_at: state.created_at,
            worker_running: state.worker.as_ref().is_some_and(|w| !w.is_finished()),
        })
    }

    /// Whether a refresh worker task is alive, with or without credentials.
    pub async fn worker_running(&self) -> bool {
        let state = self.shared.state.lock().await;
        state.worker.as_ref().is_some_and(|w| !w.is_finished())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
