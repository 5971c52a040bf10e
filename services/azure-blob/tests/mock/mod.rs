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

//! Scripted in-memory transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use blobrest_azure_blob::{BlobClient, Config};
use blobrest_core::{Context, Error, HttpSend, Result, SigningRequest};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

/// A request as it reached the transport.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Recompute the shared key signature from the recorded request.
    pub fn expected_authorization(&self, account_name: &str, account_key: &str) -> Result<String> {
        let mut builder = http::Request::builder()
            .method(self.method.clone())
            .uri(&self.uri);
        for (name, value) in self.headers.iter() {
            if name != http::header::AUTHORIZATION {
                builder = builder.header(name, value);
            }
        }
        let mut parts = builder.body(())?.into_parts().0;
        let ctx = SigningRequest::build(&mut parts)?;

        let cred = blobrest_azure_blob::Credential::with_shared_key(account_name, account_key);
        Ok(format!(
            "SharedKey {account_name}:{}",
            blobrest_azure_blob::signature(&ctx, &cred)?
        ))
    }
}

#[derive(Debug, Default)]
struct State {
    responses: VecDeque<http::Response<Bytes>>,
    requests: Vec<Recorded>,
}

/// MockHttpSend answers with queued responses, in order, and records every request.
#[derive(Debug, Clone, Default)]
pub struct MockHttpSend {
    state: Arc<Mutex<State>>,
}

impl MockHttpSend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn respond(&self, status: u16, headers: &[(&str, &str)], body: &str) -> &Self {
        let mut resp = http::Response::new(Bytes::from(body.to_string()));
        *resp.status_mut() = StatusCode::from_u16(status).expect("status must be valid");
        for (name, value) in headers {
            resp.headers_mut().append(
                http::HeaderName::from_bytes(name.as_bytes()).expect("header name must be valid"),
                value.parse().expect("header value must be valid"),
            );
        }

        self.state
            .lock()
            .expect("lock must not be poisoned")
            .responses
            .push_back(resp);
        self
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.state
            .lock()
            .expect("lock must not be poisoned")
            .requests
            .clone()
    }
}

impl HttpSend for MockHttpSend {
    fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut state = self.state.lock().expect("lock must not be poisoned");

        let (parts, body) = req.into_parts();
        state.requests.push(Recorded {
            method: parts.method,
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body,
        });

        state
            .responses
            .pop_front()
            .ok_or_else(|| Error::unexpected("connection refused: no scripted response left"))
    }
}

pub const ACCOUNT_NAME: &str = "demo";
pub const ACCOUNT_KEY: &str = "c2VjcmV0LWtleS1mb3ItdGVzdHM=";

/// A client talking to `mock`, retrying without delay.
pub fn client(mock: &MockHttpSend) -> BlobClient {
    client_with(mock, Config::default())
}

/// Like [`client`], with the remaining fields taken from `config`.
pub fn client_with(mock: &MockHttpSend, config: Config) -> BlobClient {
    let _ = env_logger::builder().is_test(true).try_init();

    BlobClient::new(
        Context::new().with_http_send(mock.clone()),
        Config {
            account_name: Some(ACCOUNT_NAME.to_string()),
            account_key: Some(ACCOUNT_KEY.to_string()),
            retry_delay: Some(Duration::ZERO),
            ..config
        },
    )
    .expect("client must be valid")
}
