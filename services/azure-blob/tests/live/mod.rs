// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Tests against a real account, enabled with `BLOBREST_AZURE_BLOB_TEST=on`.

use std::env;

use anyhow::Result;
use blobrest_azure_blob::{AccessLevel, BlobClient, BlockId, Config, Metadata};
use blobrest_core::{Context, OsEnv};
use blobrest_http_send_reqwest::ReqwestHttpSend;
use bytes::Bytes;
use log::warn;

fn init_client() -> Option<(BlobClient, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("BLOBREST_AZURE_BLOB_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default()
        .from_env(&ctx)
        .expect("config must load from env");
    let client = BlobClient::new(ctx, config).expect("client must be valid");
    let container = env::var("BLOBREST_AZURE_BLOB_CONTAINER")
        .unwrap_or_else(|_| "blobrest-test".to_string());

    Some((client, container))
}

#[test]
fn test_live_blob_round_trip() -> Result<()> {
    let Some((client, container)) = init_client() else {
        warn!("BLOBREST_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };

    client.create_container(&container, AccessLevel::Private)?;
    assert!(client.list_containers()?.contains(&container));

    let name = format!("live/{}.txt", uuid_like());
    assert!(client.put_blob(&container, &name, "hello")?);
    assert_eq!(
        client.get_blob(&container, &name)?,
        Some(Bytes::from_static(b"hello"))
    );

    let metadata = Metadata::from([("owner".to_string(), "alice".to_string())]);
    assert!(client.set_blob_metadata(&container, &name, &metadata)?);
    assert_eq!(client.get_blob_metadata(&container, &name)?, Some(metadata));

    assert!(client.delete_blob(&container, &name)?);
    assert_eq!(client.get_blob(&container, &name)?, None);
    Ok(())
}

#[test]
fn test_live_block_commit() -> Result<()> {
    let Some((client, container)) = init_client() else {
        warn!("BLOBREST_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };

    client.create_container(&container, AccessLevel::Private)?;

    let name = format!("live/{}.bin", uuid_like());
    let ids = vec![BlockId::from_index(0), BlockId::from_index(1)];
    assert!(client.put_block(&container, &name, &ids[0], "hello ")?);
    assert!(client.put_block(&container, &name, &ids[1], "world")?);
    assert!(client.put_block_list(&container, &name, &ids)?);

    assert_eq!(client.get_block_list(&container, &name)?, Some(ids));
    assert_eq!(
        client.get_blob(&container, &name)?,
        Some(Bytes::from_static(b"hello world"))
    );

    assert!(client.delete_blob(&container, &name)?);
    Ok(())
}

/// Unique enough name for concurrent runs.
fn uuid_like() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{nanos:x}-{}", std::process::id())
}
