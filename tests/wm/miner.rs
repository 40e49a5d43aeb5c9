// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed façade over a live connection.

use crate::prelude::*;
use wm_client::api::{Pool, PowerMode};

#[tokio::test]
async fn reads_and_writes_through_facade() {
    let fake = FakeMiner::new(PASSWORD);
    fake.set_read_reply(
        "get_version",
        r#"{"STATUS":"S","When":1,"Code":131,"Msg":{"api_ver":"2.0.5","fw_ver":"20230911.12.Rel","platform":"H6OS","chip":"K80"}}"#,
    );
    let endpoint = serve(&fake).await;
    let miner = Miner::connect(endpoint, Some(PASSWORD)).await.unwrap();

    let version = miner.read().version().await.unwrap();
    assert_eq!(version.msg.fw_ver, "20230911.12.Rel");

    let reply = miner.write().set_power_mode(PowerMode::Low).await.unwrap();
    assert!(reply.is_success());

    miner
        .write()
        .update_pools(&[Pool::new("stratum+tcp://pool.example:3333", "rig.7", "x")])
        .await
        .unwrap();
    let frame = fake.exec_calls().last().unwrap().frame.clone().unwrap();
    assert_eq!(frame["cmd"], json!("update_pools"));
    assert_eq!(frame["worker1"], json!("rig.7"));

    miner.close();
}

#[tokio::test]
async fn read_only_miner_refuses_writes() {
    let fake = FakeMiner::new(PASSWORD);
    let endpoint = serve(&fake).await;
    let miner = Miner::connect(endpoint, None).await.unwrap();

    let result = miner.write().set_hostname("rig-7").await;

    assert!(matches!(result, Err(Error::NoCredentials)));
    assert!(fake.requests().is_empty());
}
