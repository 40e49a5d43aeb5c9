// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fake_miner::FakeMiner;
use std::time::Duration;
use wm_core::FakeClock;
use yare::parameterized;

const MINUTE: Duration = Duration::from_secs(60);

fn builder(miner: &FakeMiner, clock: &FakeClock) -> SessionBuilder<FakeClock> {
    SessionBuilder::new(Endpoint::new("miner.test", 4028))
        .transport(miner.clone())
        .clock(clock.clone())
}

/// Let the freshly spawned worker reach its first sleep.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn wait_for_worker_exit(session: &Session<FakeClock>) {
    for _ in 0..100 {
        if !session.worker_running().await {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("refresh worker still running");
}

#[tokio::test]
async fn without_password_session_is_read_only() {
    let miner = FakeMiner::new("admin");
    let session = builder(&miner, &FakeClock::new()).connect().await.unwrap();

    assert!(matches!(session.has_write_access().await, Err(Error::NoCredentials)));
    assert!(session.snapshot().await.is_none());
    assert!(!session.worker_running().await);
    assert_eq!(miner.token_requests(), 0);
}

#[tokio::test]
async fn empty_password_means_read_only() {
    let miner = FakeMiner::new("admin");
    let session =
        builder(&miner, &FakeClock::new()).admin_password("").connect().await.unwrap();

    assert!(matches!(session.has_write_access().await, Err(Error::NoCredentials)));
    assert_eq!(miner.token_requests(), 0);
}

#[tokio::test]
async fn password_derives_credentials_and_starts_worker() {
    let miner = FakeMiner::new("admin");
    let clock = FakeClock::new();
    let session = builder(&miner, &clock).admin_password("admin").connect().await.unwrap();

    let snapshot = session.snapshot().await.unwrap();
    let expected = miner.current_credentials().unwrap();
    assert_eq!(&snapshot.key, expected.key());
    assert_eq!(snapshot.sign, expected.sign());
    assert_eq!(snapshot.created_at, clock.now());
    assert!(snapshot.worker_running);
    assert_eq!(miner.token_requests(), 1);
    session.has_write_access().await.unwrap();
}

#[tokio::test]
async fn busy_miner_fails_construction() {
    let miner = FakeMiner::new("admin");
    miner.set_busy(true);

    let result = builder(&miner, &FakeClock::new()).admin_password("admin").connect().await;

    assert!(matches!(result, Err(Error::PeerBusy)));
    assert_eq!(miner.token_requests(), 1);
}

#[tokio::test]
async fn bad_salt_fails_construction() {
    let miner = FakeMiner::new("admin").with_token("ab cd", "12345678", 1);

    let result = builder(&miner, &FakeClock::new()).admin_password("admin").connect().await;

    assert!(matches!(result, Err(Error::Credential(CredentialError::BadSalt(_)))));
}

#[tokio::test]
async fn invalid_config_is_rejected_before_any_exchange() {
    let miner = FakeMiner::new("admin");
    let config = SessionConfig { refresh_interval: 30 * MINUTE, ..SessionConfig::default() };

    let result =
        builder(&miner, &FakeClock::new()).config(config).admin_password("admin").connect().await;

    assert!(matches!(result, Err(Error::Config(_))));
    assert!(miner.requests().is_empty());
}

#[tokio::test]
async fn enable_write_access_upgrades_read_only_session() {
    let miner = FakeMiner::new("admin");
    let session = builder(&miner, &FakeClock::new()).connect().await.unwrap();

    session.enable_write_access("admin").await.unwrap();

    session.has_write_access().await.unwrap();
    assert!(session.snapshot().await.unwrap().worker_running);
}

#[tokio::test]
async fn failed_upgrade_keeps_session_read_only() {
    let miner = FakeMiner::new("admin");
    let session = builder(&miner, &FakeClock::new()).connect().await.unwrap();
    miner.set_busy(true);

    let result = session.enable_write_access("admin").await;

    assert!(matches!(result, Err(Error::PeerBusy)));
    assert!(matches!(session.has_write_access().await, Err(Error::NoCredentials)));
    assert!(!session.worker_running().await);
}

#[tokio::test]
async fn enable_write_access_rejects_empty_password() {
    let miner = FakeMiner::new("admin");
    let session = builder(&miner, &FakeClock::new()).connect().await.unwrap();

    let result = session.enable_write_access("").await;

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(miner.token_requests(), 0);
}

#[tokio::test]
async fn key_younger_than_max_age_is_reused() {
    let miner = FakeMiner::new("admin");
    let clock = FakeClock::new();
    let session = builder(&miner, &clock).admin_password("admin").connect().await.unwrap();

    clock.advance(29 * MINUTE);
    session.has_write_access().await.unwrap();

    assert_eq!(miner.token_requests(), 1);
}

#[tokio::test]
async fn overdue_key_is_rederived_synchronously() {
    let miner = FakeMiner::new("admin");
    let clock = FakeClock::new();
    let session = builder(&miner, &clock).admin_password("admin").connect().await.unwrap();
    let before = session.snapshot().await.unwrap();

    clock.advance(31 * MINUTE);
    session.has_write_access().await.unwrap();

    let after = session.snapshot().await.unwrap();
    assert_eq!(miner.token_requests(), 2);
    assert_ne!(after.sign, before.sign);
    assert_eq!(after.created_at, clock.now());
}

#[tokio::test]
async fn failed_rederive_keeps_previous_pair() {
    let miner = FakeMiner::new("admin");
    let clock = FakeClock::new();
    let session = builder(&miner, &clock).admin_password("admin").connect().await.unwrap();
    let before = session.snapshot().await.unwrap();

    miner.set_busy(true);
    clock.advance(31 * MINUTE);

    assert!(matches!(session.has_write_access().await, Err(Error::PeerBusy)));
    assert_eq!(session.snapshot().await.unwrap(), before);
}

#[tokio::test(start_paused = true)]
async fn worker_refreshes_before_expiry() {
    let miner = FakeMiner::new("admin");
    let clock = FakeClock::new();
    let session = builder(&miner, &clock).admin_password("admin").connect().await.unwrap();
    settle().await;
    let before = session.snapshot().await.unwrap();

    clock.advance(25 * MINUTE);
    tokio::time::sleep(25 * MINUTE + Duration::from_secs(1)).await;

    let after = session.snapshot().await.unwrap();
    assert_eq!(miner.token_requests(), 2);
    assert_ne!(after.sign, before.sign);
    assert_eq!(after.created_at, clock.now());
}

#[tokio::test(start_paused = true)]
async fn worker_skips_refresh_when_key_was_renewed() {
    let miner = FakeMiner::new("admin");
    let clock = FakeClock::new();
    let session = builder(&miner, &clock).admin_password("admin").connect().await.unwrap();
    settle().await;

    // The fake clock has not moved, so the key is still fresh when the worker wakes
    tokio::time::sleep(25 * MINUTE + Duration::from_secs(1)).await;

    assert_eq!(miner.token_requests(), 1);
    assert!(session.worker_running().await);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_goes_to_sink_and_waits_full_interval() {
    let miner = FakeMiner::new("admin");
    let clock = FakeClock::new();
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    let session = builder(&miner, &clock)
        .admin_password("admin")
        .on_refresh_error(move |err| sink.lock().push(err.to_string()))
        .connect()
        .await
        .unwrap();
    settle().await;

    miner.set_busy(true);
    clock.advance(25 * MINUTE);
    tokio::time::sleep(25 * MINUTE + Duration::from_secs(1)).await;

    assert_eq!(miner.token_requests(), 2);
    assert_eq!(
        *failures.lock(),
        vec!["background token refresh failed: miner is busy: over max connect".to_string()]
    );

    // No retry until a full interval has passed
    tokio::time::sleep(MINUTE).await;
    assert_eq!(miner.token_requests(), 2);

    miner.set_busy(false);
    tokio::time::sleep(25 * MINUTE).await;
    assert_eq!(miner.token_requests(), 3);
    assert_eq!(failures.lock().len(), 1);
    session.has_write_access().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn sink_can_be_installed_after_construction() {
    let miner = FakeMiner::new("admin");
    let clock = FakeClock::new();
    let session = builder(&miner, &clock).admin_password("admin").connect().await.unwrap();
    settle().await;
    let failures = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&failures);
    session.set_refresh_error_sink(move |err| {
        assert!(matches!(err, Error::RefreshFailed(_)));
        *sink.lock() += 1;
    });

    miner.set_busy(true);
    clock.advance(25 * MINUTE);
    tokio::time::sleep(25 * MINUTE + Duration::from_secs(1)).await;

    assert_eq!(*failures.lock(), 1);
}

#[tokio::test]
async fn close_stops_worker_and_is_idempotent() {
    let miner = FakeMiner::new("admin");
    let session =
        builder(&miner, &FakeClock::new()).admin_password("admin").connect().await.unwrap();

    session.close();
    session.close();

    assert!(session.is_closed());
    wait_for_worker_exit(&session).await;
}

#[parameterized(
    over_max_connect = { r#"{"Msg":"over max connect"}"#, "busy" },
    other_text       = { r#"{"Msg":"invalid cmd"}"#, "malformed" },
    number_msg       = { r#"{"Msg":42}"#, "malformed" },
    missing_msg      = { r#"{"STATUS":"S"}"#, "malformed" },
    missing_field    = { r#"{"Msg":{"salt":"abcdefgh","time":1}}"#, "malformed" },
    not_json         = { "over max connect", "bad_response" },
)]
fn rejects_token_reply(raw: &str, kind: &str) {
    let err = parse_token_reply(raw.as_bytes()).unwrap_err();
    let actual = match err {
        Error::PeerBusy => "busy",
        Error::Credential(CredentialError::MalformedToken(_)) => "malformed",
        Error::BadResponse(_) => "bad_response",
        other => panic!("unexpected error {other:?}"),
    };
    assert_eq!(actual, kind);
}

#[test]
fn token_reply_is_not_sanitized() {
    let raw = br#"{"Msg":{"salt":"infnan12","newsalt":"nan","time":1700000000}}"#;

    let token = parse_token_reply(raw).unwrap();

    assert_eq!(token.salt, "infnan12");
    assert_eq!(token.newsalt, "nan");
    assert_eq!(token.time.as_u64(), Some(1_700_000_000));
}
