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

use blobrest_core::retry::{Retry, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use blobrest_core::time::{format_http_date, now};
use blobrest_core::{Context, Error, Result, Signer};
use bytes::Bytes;
use http::StatusCode;
use log::debug;

use crate::constants::*;
use crate::request::{BlobRequest, RequestBuilder};
use crate::{Config, Credential, RequestSigner};

/// BlobClient talks to one storage account.
///
/// Everything it holds is fixed at construction, so a client can be cloned
/// and shared between threads freely.
#[derive(Debug, Clone)]
pub struct BlobClient {
    ctx: Context,
    builder: RequestBuilder,
    signer: Signer<Credential>,
    retry: Retry,
    lease_duration: i32,
}

impl BlobClient {
    /// Create a new client from `config`.
    ///
    /// Returns [`blobrest_core::ErrorKind::ConfigInvalid`] if the account
    /// name or key is missing, the key is not base64, or a tunable is out of range.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let account_name = config
            .account_name
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("account name is required"))?;
        let account_key = config
            .account_key
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("account key is required"))?;

        let credential = Credential::with_shared_key(&account_name, &account_key);
        credential.decoded_key().map_err(|e| {
            Error::config_invalid("account key must be base64 encoded").with_source(e)
        })?;

        let endpoint = config
            .endpoint
            .unwrap_or_else(|| format!("https://{account_name}.blob.{DEFAULT_ENDPOINT_SUFFIX}"));
        let builder = RequestBuilder::new(
            &endpoint,
            config
                .service_version
                .as_deref()
                .unwrap_or(DEFAULT_SERVICE_VERSION),
            config
                .content_type
                .as_deref()
                .unwrap_or(DEFAULT_CONTENT_TYPE),
        )?;

        let lease_duration = config.lease_duration.unwrap_or(DEFAULT_LEASE_DURATION);
        if lease_duration != -1 && !(15..=60).contains(&lease_duration) {
            return Err(Error::config_invalid(format!(
                "lease duration must be -1 or between 15 and 60 seconds, got {lease_duration}"
            )));
        }

        let retry = Retry::new(
            config.retry_times.unwrap_or(DEFAULT_MAX_RETRIES),
            config.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
        );

        Ok(Self {
            signer: Signer::new(ctx.clone(), credential, RequestSigner::new()),
            ctx,
            builder,
            retry,
            lease_duration,
        })
    }

    /// Replace the retry executor, for example to use another policy.
    pub fn with_retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    /// Storage account this client signs for.
    pub fn account_name(&self) -> &str {
        &self.signer.credential().account_name
    }

    /// Endpoint every request is sent to, without trailing `/`.
    pub fn endpoint(&self) -> &str {
        self.builder.endpoint()
    }

    /// Value sent as `x-ms-version`.
    pub fn service_version(&self) -> &str {
        self.builder.service_version()
    }

    pub(crate) fn lease_duration(&self) -> i32 {
        self.lease_duration
    }

    /// Send `req` through the retry executor.
    ///
    /// Returns the response on any 2xx status and `None` when the status is
    /// one of `benign`. Every other status fails the attempt.
    pub(crate) fn send(
        &self,
        req: &BlobRequest,
        benign: &[StatusCode],
    ) -> Result<Option<http::Response<Bytes>>> {
        // Built once so malformed requests fail before the first attempt.
        let template = self.builder.build(req, now())?;

        self.retry.run(|| {
            let mut attempt = http::Request::new(template.body().clone());
            *attempt.method_mut() = template.method().clone();
            *attempt.uri_mut() = template.uri().clone();
            *attempt.headers_mut() = template.headers().clone();
            attempt
                .headers_mut()
                .insert(X_MS_DATE, format_http_date(now()).parse()?);

            let (mut parts, body) = attempt.into_parts();
            self.signer.sign(&mut parts)?;

            let resp = self
                .ctx
                .http_send(http::Request::from_parts(parts, body))?;
            let status = resp.status();
            debug!("{} {} => {}", template.method(), template.uri(), status);

            if status.is_success() {
                return Ok(Some(resp));
            }
            if benign.contains(&status) {
                return Ok(None);
            }

            let code = resp
                .headers()
                .get(X_MS_ERROR_CODE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            Err(Error::service_failed(
                status,
                format!(
                    "{} {} failed with {}: {}",
                    template.method(),
                    req.path(),
                    status,
                    code
                ),
            ))
        })
    }

    /// Like [`Self::send`], for operations whose only result is success or not.
    pub(crate) fn send_ok(&self, req: &BlobRequest, benign: &[StatusCode]) -> Result<bool> {
        Ok(self.send(req, benign)?.is_some())
    }
}
