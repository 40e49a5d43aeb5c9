// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted miner emulator for tests.
//!
//! [`FakeMiner`] answers token requests, checks and decrypts authenticated
//! frames with the same derivation the client uses, and replies with
//! PKCS-style padded ciphertext. It runs in memory as a [`Transport`] or
//! behind a real TCP listener via [`FakeMiner::serve_tcp`].

use crate::credential::{self, Credentials, TokenInfo};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wm_core::Endpoint;
use wm_wire::{JsonObject, Transport, WireError, BLOCK_SIZE, GET_TOKEN};

pub const FAKE_SALT: &str = "abcdefgh";
pub const FAKE_NEWSALT: &str = "12345678";
pub const FAKE_TIME: u64 = 1_700_000_000;

/// One decrypted authenticated frame.
#[derive(Debug, Clone)]
pub struct ExecCall {
    /// Decrypted bytes, padding included.
    pub padded: Vec<u8>,
    /// Parsed command object, if the padding-stripped bytes were JSON.
    pub frame: Option<JsonObject>,
}

struct FakeMinerState {
    password: String,
    salt: String,
    newsalt: String,
    time: u64,
    busy: bool,
    denied: HashSet<String>,
    read_replies: HashMap<String, String>,
    exec_replies: HashMap<String, Value>,
    current: Option<Credentials>,
    token_requests: usize,
    requests: Vec<Vec<u8>>,
    exec_calls: Vec<ExecCall>,
}

/// In-memory miner. Clones share state.
#[derive(Clone)]
pub struct FakeMiner {
    inner: Arc<Mutex<FakeMinerState>>,
}

impl FakeMiner {
    pub fn new(password: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeMinerState {
                password: password.to_string(),
                salt: FAKE_SALT.to_string(),
                newsalt: FAKE_NEWSALT.to_string(),
                time: FAKE_TIME,
                busy: false,
                denied: HashSet::new(),
                read_replies: HashMap::new(),
                exec_replies: HashMap::new(),
                current: None,
                token_requests: 0,
                requests: Vec::new(),
                exec_calls: Vec::new(),
            })),
        }
    }

    /// Override the token record. `time` grows by one per issued token.
    pub fn with_token(self, salt: &str, newsalt: &str, time: u64) -> Self {
        {
            let mut state = self.inner.lock();
            state.salt = salt.to_string();
            state.newsalt = newsalt.to_string();
            state.time = time;
        }
        self
    }

    /// Answer token requests with "over max connect".
    pub fn set_busy(&self, busy: bool) {
        self.inner.lock().busy = busy;
    }

    /// Reject `cmd` with a plaintext `STATUS: "E"` reply.
    pub fn deny(&self, cmd: &str) {
        self.inner.lock().denied.insert(cmd.to_string());
    }

    /// Raw reply text for a read command; may contain `nan`/`inf`.
    pub fn set_read_reply(&self, cmd: &str, raw: impl Into<String>) {
        self.inner.lock().read_replies.insert(cmd.to_string(), raw.into());
    }

    /// Plaintext reply encrypted back for an authenticated command.
    pub fn set_exec_reply(&self, cmd: &str, reply: Value) {
        self.inner.lock().exec_replies.insert(cmd.to_string(), reply);
    }

    pub fn token_requests(&self) -> usize {
        self.inner.lock().token_requests
    }

    /// Every raw request received, in order.
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.inner.lock().requests.clone()
    }

    pub fn exec_calls(&self) -> Vec<ExecCall> {
        self.inner.lock().exec_calls.clone()
    }

    /// Credentials from the most recently issued token.
    pub fn current_credentials(&self) -> Option<Credentials> {
        self.inner.lock().current.clone()
    }

    /// Accept connections on an ephemeral loopback port until the runtime
    /// shuts down.
    pub async fn serve_tcp(&self) -> std::io::Result<Endpoint> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        let miner = self.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let miner = miner.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    if stream.read_to_end(&mut request).await.is_err() {
                        return;
                    }
                    let reply = miner.respond(&request);
                    let _ = stream.write_all(&reply).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        Ok(Endpoint::new("127.0.0.1", port))
    }

    /// Produce the reply bytes for one request.
    pub fn respond(&self, request: &[u8]) -> Vec<u8> {
        let mut state = self.inner.lock();
        state.requests.push(request.to_vec());

        if request == GET_TOKEN {
            return state.issue_token();
        }
        let frame: JsonObject = match serde_json::from_slice(request) {
            Ok(frame) => frame,
            Err(_) => return status_error("invalid json"),
        };
        match frame.get("data").and_then(Value::as_str) {
            Some(data) if frame.contains_key("enc") => state.authenticated(data),
            _ => state.read(&frame),
        }
    }
}

impl FakeMinerState {
    fn issue_token(&mut self) -> Vec<u8> {
        self.token_requests += 1;
        if self.busy {
            return br#"{"Msg":"over max connect"}"#.to_vec();
        }
        self.time += 1;
        let token = TokenInfo {
            salt: self.salt.clone(),
            newsalt: self.newsalt.clone(),
            time: self.time.into(),
        };
        self.current = credential::derive(&self.password, &token).ok();
        let reply = json!({
            "STATUS": "S",
            "When": self.time,
            "Code": 134,
            "Msg": { "salt": token.salt, "newsalt": token.newsalt, "time": self.time },
            "Description": "",
        });
        reply.to_string().into_bytes()
    }

    fn read(&self, frame: &JsonObject) -> Vec<u8> {
        let cmd = frame.get("cmd").and_then(Value::as_str).unwrap_or_default();
        match self.read_replies.get(cmd) {
            Some(raw) => raw.clone().into_bytes(),
            None => status_error("invalid cmd"),
        }
    }

    fn authenticated(&mut self, data: &str) -> Vec<u8> {
        let Some(current) = self.current.clone() else {
            return status_error("no token issued");
        };
        let padded = match BASE64.decode(data).map_err(|e| e.to_string()).and_then(|ciphertext| {
            current.cipher().decrypt(&ciphertext).map_err(|e: WireError| e.to_string())
        }) {
            Ok(padded) => padded,
            Err(_) => return status_error("decrypt failed"),
        };

        let body = padded.split(|b| *b == 0).next().unwrap_or_default();
        let frame: Option<JsonObject> = serde_json::from_slice(body).ok();
        self.exec_calls.push(ExecCall { padded, frame: frame.clone() });

        let Some(frame) = frame else {
            return status_error("invalid json");
        };
        if frame.get("token").and_then(Value::as_str) != Some(current.sign()) {
            return status_error("invalid token");
        }
        let cmd = frame.get("cmd").and_then(Value::as_str).unwrap_or_default();
        if self.denied.contains(cmd) {
            return status_error("denied");
        }

        let reply = self
            .exec_replies
            .get(cmd)
            .cloned()
            .unwrap_or_else(|| json!({ "STATUS": "S", "When": self.time, "Code": 131, "Msg": "ok" }));
        match seal_reply(&current, &reply) {
            Some(bytes) => bytes,
            None => status_error("encrypt failed"),
        }
    }
}

/// `{"enc": base64(AES(pkcs_pad(reply)))}`
fn seal_reply(credentials: &Credentials, reply: &Value) -> Option<Vec<u8>> {
    let mut plain = reply.to_string().into_bytes();
    let pad = BLOCK_SIZE - plain.len() % BLOCK_SIZE;
    plain.extend(std::iter::repeat(pad as u8).take(pad));
    let ciphertext = credentials.cipher().encrypt(&plain).ok()?;
    Some(json!({ "enc": BASE64.encode(ciphertext) }).to_string().into_bytes())
}

fn status_error(msg: &str) -> Vec<u8> {
    json!({ "STATUS": "E", "When": FAKE_TIME, "Code": 23, "Msg": msg }).to_string().into_bytes()
}

#[async_trait]
impl Transport for FakeMiner {
    async fn exchange(&self, _endpoint: &Endpoint, request: &[u8]) -> Result<Vec<u8>, WireError> {
        Ok(self.respond(request))
    }
}
