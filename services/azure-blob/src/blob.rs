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

use std::fmt::{Display, Formatter};

use blobrest_core::hash::base64_md5;
use blobrest_core::{Error, Result};
use bytes::Bytes;
use http::{Method, StatusCode};
use log::debug;

use crate::constants::*;
use crate::metadata::{self, Metadata, Properties};
use crate::request::BlobRequest;
use crate::BlobClient;

pub(crate) const NOT_FOUND_OR_CONFLICT: &[StatusCode] =
    &[StatusCode::NOT_FOUND, StatusCode::CONFLICT];

/// Action performed by [`BlobClient::lease_blob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseAction {
    /// Take a new lease, the service issues its id.
    Acquire,
    /// Extend a lease held by the caller.
    Renew,
    /// End a lease at once, it can not be renewed afterwards.
    Break,
    /// Give up a lease held by the caller.
    Release,
}

impl LeaseAction {
    /// Value of the `x-ms-lease-action` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseAction::Acquire => "acquire",
            LeaseAction::Renew => "renew",
            LeaseAction::Break => "break",
            LeaseAction::Release => "release",
        }
    }
}

impl Display for LeaseAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BlobClient {
    /// Read the content of a blob.
    ///
    /// Returns `None` if the blob doesn't exist or is in conflict.
    pub fn get_blob(&self, container: &str, blob: &str) -> Result<Option<Bytes>> {
        let req = BlobRequest::blob(Method::GET, container, blob)?;

        Ok(self
            .send(&req, NOT_FOUND_OR_CONFLICT)?
            .map(http::Response::into_body))
    }

    /// Write `content` as a block blob, replacing any existing one.
    pub fn put_blob(&self, container: &str, blob: &str, content: impl Into<Bytes>) -> Result<bool> {
        let req = block_blob_request(container, blob, content.into())?;

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }

    /// Create an empty page blob of `size` bytes, a multiple of 512.
    pub fn put_page_blob(&self, container: &str, blob: &str, size: u64) -> Result<bool> {
        if size % PAGE_SIZE != 0 {
            return Err(Error::request_invalid(format!(
                "page blob size must be a multiple of {PAGE_SIZE}, got {size}"
            )));
        }

        let req = BlobRequest::blob(Method::PUT, container, blob)?
            .with_header(X_MS_BLOB_TYPE, "PageBlob")?
            .with_header(X_MS_BLOB_CONTENT_LENGTH, &size.to_string())?;

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }

    /// Write `content` only if the blob still has the ETag `etag`.
    ///
    /// Returns `false` when the ETag no longer matches.
    pub fn put_blob_if_unchanged(
        &self,
        container: &str,
        blob: &str,
        content: impl Into<Bytes>,
        etag: &str,
    ) -> Result<bool> {
        let req = block_blob_request(container, blob, content.into())?.with_if_match(etag)?;

        self.send_ok(
            &req,
            &[
                StatusCode::NOT_FOUND,
                StatusCode::CONFLICT,
                StatusCode::PRECONDITION_FAILED,
            ],
        )
    }

    /// Write `content` along with its MD5, so the service can verify it.
    ///
    /// Returns `false` when the service rejects the content as corrupted.
    pub fn put_blob_with_md5(
        &self,
        container: &str,
        blob: &str,
        content: impl Into<Bytes>,
    ) -> Result<bool> {
        let content = content.into();
        let md5 = base64_md5(&content);
        let req = block_blob_request(container, blob, content)?.with_content_md5(&md5)?;

        self.send_ok(
            &req,
            &[
                StatusCode::BAD_REQUEST,
                StatusCode::NOT_FOUND,
                StatusCode::CONFLICT,
            ],
        )
    }

    /// Start a server side copy of a blob.
    ///
    /// The copy may still be running when this returns `true`, the service
    /// only acknowledged it.
    pub fn copy_blob(
        &self,
        source_container: &str,
        source_blob: &str,
        container: &str,
        blob: &str,
    ) -> Result<bool> {
        let source = BlobRequest::blob(Method::GET, source_container, source_blob)?.path();
        let source = if self.service_version() < COPY_SOURCE_URL_SINCE {
            format!("/{}{}", self.account_name(), source)
        } else {
            format!("{}{}", self.endpoint(), source)
        };
        debug!("copy {source} to {container}/{blob}");

        let req = BlobRequest::blob(Method::PUT, container, blob)?
            .with_header(X_MS_COPY_SOURCE, &source)?;

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }

    /// Take a read-only snapshot of a blob.
    pub fn snapshot_blob(&self, container: &str, blob: &str) -> Result<bool> {
        let req = BlobRequest::blob(Method::PUT, container, blob)?.with_query("comp", "snapshot");

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }

    /// Delete a blob. Returns `false` if it doesn't exist or is leased.
    pub fn delete_blob(&self, container: &str, blob: &str) -> Result<bool> {
        let req = BlobRequest::blob(Method::DELETE, container, blob)?;

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }

    /// Acquire, renew, break or release the lease of a blob.
    ///
    /// `lease_id` is required for every action but [`LeaseAction::Acquire`].
    /// Returns the lease id reported by the service, or `None` if the blob
    /// doesn't exist or the lease is held by someone else.
    pub fn lease_blob(
        &self,
        container: &str,
        blob: &str,
        action: LeaseAction,
        lease_id: Option<&str>,
    ) -> Result<Option<String>> {
        let mut req = BlobRequest::blob(Method::PUT, container, blob)?
            .with_query("comp", "lease")
            .with_header(X_MS_LEASE_ACTION, action.as_str())?;

        req = match (action, lease_id) {
            (LeaseAction::Acquire, _) => {
                req.with_header(X_MS_LEASE_DURATION, &self.lease_duration().to_string())?
            }
            (_, Some(id)) => req.with_header(X_MS_LEASE_ID, id)?,
            (_, None) => {
                return Err(Error::request_invalid(format!(
                    "lease id is required to {action} a lease"
                )))
            }
        };

        let Some(resp) = self.send(&req, NOT_FOUND_OR_CONFLICT)? else {
            return Ok(None);
        };

        let issued = resp
            .headers()
            .get(X_MS_LEASE_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(issued.or_else(|| lease_id.map(str::to_string)))
    }

    /// Get every property the service reports for a blob, keyed by header name.
    pub fn get_blob_properties(&self, container: &str, blob: &str) -> Result<Option<Properties>> {
        let req = BlobRequest::blob(Method::HEAD, container, blob)?;

        Ok(self
            .send(&req, NOT_FOUND_OR_CONFLICT)?
            .map(|resp| metadata::properties_from_headers(resp.headers())))
    }

    /// Set blob properties, each entry sent as a header verbatim
    /// (for example `x-ms-blob-content-type`).
    pub fn set_blob_properties(
        &self,
        container: &str,
        blob: &str,
        properties: &Properties,
    ) -> Result<bool> {
        let mut req =
            BlobRequest::blob(Method::PUT, container, blob)?.with_query("comp", "properties");
        for (name, value) in properties {
            req = req.with_header(name, value)?;
        }

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }

    /// Get the user defined metadata of a blob, `None` if it doesn't exist.
    pub fn get_blob_metadata(&self, container: &str, blob: &str) -> Result<Option<Metadata>> {
        let req = BlobRequest::blob(Method::GET, container, blob)?.with_query("comp", "metadata");

        Ok(self
            .send(&req, NOT_FOUND_OR_CONFLICT)?
            .map(|resp| metadata::from_headers(resp.headers())))
    }

    /// Replace the user defined metadata of a blob.
    pub fn set_blob_metadata(
        &self,
        container: &str,
        blob: &str,
        metadata: &Metadata,
    ) -> Result<bool> {
        let req = BlobRequest::blob(Method::PUT, container, blob)?.with_query("comp", "metadata");
        let req = metadata::to_headers(req, metadata)?;

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }
}

fn block_blob_request(container: &str, blob: &str, content: Bytes) -> Result<BlobRequest> {
    Ok(BlobRequest::blob(Method::PUT, container, blob)?
        .with_header(X_MS_BLOB_TYPE, "BlockBlob")?
        .with_body(content))
}
