// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plaintext read path.

use crate::prelude::*;

#[tokio::test]
async fn summary_rewrites_non_json_numbers() {
    let miner = FakeMiner::new(PASSWORD);
    miner.set_read_reply(
        "summary",
        r#"{"STATUS":[{"STATUS":"S","Msg":"Summary"}],"SUMMARY":[{"MHS av": nan,"Power Rate":inf}]}"#,
    );
    let endpoint = serve(&miner).await;
    let session = Session::connect(endpoint, None).await.unwrap();

    let reply = wm_client::read(&session, "summary", None).await.unwrap();

    assert_eq!(miner.requests(), vec![b"{\"cmd\":\"summary\"}\n".to_vec()]);
    assert_eq!(reply["SUMMARY"][0]["MHS av"], json!(0));
    assert_eq!(reply["SUMMARY"][0]["Power Rate"], json!(999));
}

#[tokio::test]
async fn read_needs_no_password() {
    let miner = FakeMiner::new(PASSWORD);
    miner.set_read_reply("pools", r#"{"STATUS":[{"STATUS":"S"}],"POOLS":[]}"#);
    let endpoint = serve(&miner).await;
    let session = Session::connect(endpoint, None).await.unwrap();

    let reply = wm_client::read(&session, "pools", None).await.unwrap();

    assert_eq!(reply["POOLS"], json!([]));
    assert_eq!(miner.token_requests(), 0);
}

#[tokio::test]
async fn unreachable_miner_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let session = Session::connect(Endpoint::new("127.0.0.1", port), None).await.unwrap();

    let result = wm_client::read(&session, "summary", None).await;

    assert!(matches!(result, Err(Error::Transport(_))));
}
