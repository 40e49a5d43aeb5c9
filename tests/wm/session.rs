// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token bootstrap, busy miners and forced rederivation.

use crate::prelude::*;

#[tokio::test]
async fn password_bootstraps_key_and_sign() {
    let miner = FakeMiner::new(PASSWORD).with_token("abcdefgh", "12345678", 1_699_999_999);
    let endpoint = serve(&miner).await;

    let session = Session::connect(endpoint, Some(PASSWORD)).await.unwrap();

    let snapshot = session.snapshot().await.unwrap();
    let expected = miner.current_credentials().unwrap();
    assert_eq!(&snapshot.key, expected.key());
    // time 1700000000 after the fake miner's per-token increment
    assert_eq!(snapshot.sign, "aCXzXlEkRnXP7r4Vq5cK40");
    let age = Instant::now().saturating_duration_since(snapshot.created_at);
    assert!(age < Duration::from_secs(2), "created_at is {age:?} old");
    assert!(snapshot.worker_running);
}

#[tokio::test]
async fn busy_miner_rejects_construction() {
    let miner = FakeMiner::new(PASSWORD);
    miner.set_busy(true);
    let endpoint = serve(&miner).await;

    let result = Session::connect(endpoint, Some(PASSWORD)).await;

    assert!(matches!(result, Err(Error::PeerBusy)));
    assert_eq!(miner.token_requests(), 1);
}

#[tokio::test]
async fn overdue_key_is_rederived_before_exec() {
    let miner = FakeMiner::new(PASSWORD);
    let endpoint = serve(&miner).await;
    let clock = FakeClock::new();
    let session = SessionBuilder::new(endpoint)
        .clock(clock.clone())
        .admin_password(PASSWORD)
        .connect()
        .await
        .unwrap();
    let before = session.snapshot().await.unwrap();

    // The worker sleeps in real time, so it stays parked while the fake clock jumps
    clock.advance(Duration::from_secs(31 * 60));
    wm_client::exec(&session, "power_on", None).await.unwrap();

    assert_eq!(miner.token_requests(), 2);
    let after = session.snapshot().await.unwrap();
    assert_ne!(after.sign, before.sign);
    assert_eq!(after.created_at, clock.now());
    let frame = miner.exec_calls().last().unwrap().frame.clone().unwrap();
    assert_eq!(frame["token"], json!(after.sign));
}

#[tokio::test]
async fn read_only_session_upgrades_in_place() {
    let miner = FakeMiner::new(PASSWORD);
    let endpoint = serve(&miner).await;
    let session = Session::connect(endpoint, None).await.unwrap();
    assert!(matches!(session.has_write_access().await, Err(Error::NoCredentials)));

    session.enable_write_access(PASSWORD).await.unwrap();

    wm_client::exec(&session, "power_on", None).await.unwrap();
    session.close();
    assert!(session.is_closed());
}
