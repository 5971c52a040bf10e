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

use std::time::Duration;

use anyhow::Result;
use blobrest_core::retry::{Retry, TransientOnly};
use blobrest_core::ErrorKind;
use http::StatusCode;
use pretty_assertions::assert_eq;

use crate::mock::{client, MockHttpSend};

#[test]
fn test_retry_server_error_then_success() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(500, &[("x-ms-error-code", "InternalError")], "")
        .respond(503, &[("x-ms-error-code", "ServerBusy")], "")
        .respond(201, &[], "");

    assert!(client(&mock).put_blob("photos", "cat.jpg", "meow")?);

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 3);
    // Every attempt carries its own signature.
    assert!(reqs.iter().all(|r| r.header("authorization").is_some()));
    Ok(())
}

#[test]
fn test_retry_exhausted_returns_last_error() {
    let mock = MockHttpSend::new();
    for _ in 0..4 {
        mock.respond(500, &[("x-ms-error-code", "InternalError")], "");
    }

    let err = client(&mock).get_blob("photos", "cat.jpg").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceFailed);
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err.to_string().contains("InternalError"));
    assert_eq!(mock.requests().len(), 4);
}

#[test]
fn test_retry_transport_failure() {
    // Nothing scripted: every attempt fails in the transport.
    let mock = MockHttpSend::new();

    let err = client(&mock).list_containers().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert_eq!(mock.requests().len(), 4);
}

#[test]
fn test_always_retry_includes_client_errors() {
    let mock = MockHttpSend::new();
    for _ in 0..4 {
        mock.respond(403, &[("x-ms-error-code", "AuthenticationFailed")], "");
    }

    let err = client(&mock).list_containers().unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(mock.requests().len(), 4);
}

#[test]
fn test_transient_only_stops_on_client_errors() {
    let mock = MockHttpSend::new();
    mock.respond(403, &[("x-ms-error-code", "AuthenticationFailed")], "");

    let client = client(&mock)
        .with_retry(Retry::new(3, Duration::ZERO).with_policy(TransientOnly));

    let err = client.list_containers().unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(mock.requests().len(), 1);
}
