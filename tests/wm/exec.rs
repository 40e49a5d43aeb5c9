// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated command path.

use crate::prelude::*;

#[tokio::test]
async fn power_off_round_trips_through_ciphertext() {
    let miner = FakeMiner::new(PASSWORD);
    miner.set_exec_reply("power_off", json!({"STATUS": "S", "Msg": "ok"}));
    let endpoint = serve(&miner).await;
    let session = Session::connect(endpoint, Some(PASSWORD)).await.unwrap();
    let sign = session.snapshot().await.unwrap().sign;

    let reply = wm_client::exec(&session, "power_off", Some(Default::default())).await.unwrap();

    let call = miner.exec_calls().pop().unwrap();
    let plain = format!(r#"{{"cmd":"power_off","token":"{sign}"}}"#).into_bytes();
    assert_eq!(call.padded.len() % 16, 0);
    assert_eq!(&call.padded[..plain.len()], plain.as_slice());
    assert!(call.padded[plain.len()..].iter().all(|b| *b == 0));
    assert_eq!(serde_json::Value::Object(reply), json!({"STATUS": "S", "Msg": "ok"}));
}

#[tokio::test]
async fn plaintext_error_becomes_peer_error() {
    let miner = FakeMiner::new(PASSWORD);
    miner.deny("factory_reset");
    let endpoint = serve(&miner).await;
    let session = Session::connect(endpoint, Some(PASSWORD)).await.unwrap();

    let result = wm_client::exec(&session, "factory_reset", None).await;

    match result {
        Err(Error::PeerError { msg }) => assert_eq!(msg, "denied"),
        other => panic!("expected PeerError, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_password_is_rejected_by_miner() {
    let miner = FakeMiner::new(PASSWORD);
    let endpoint = serve(&miner).await;
    let session = Session::connect(endpoint, Some("not-the-password")).await.unwrap();

    let result = wm_client::exec(&session, "reboot", None).await;

    // Key mismatch: the miner cannot decrypt the frame
    assert!(matches!(result, Err(Error::PeerError { .. })));
}
