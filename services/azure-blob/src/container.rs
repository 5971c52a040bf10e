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

use blobrest_core::{Error, Result};
use bytes::Bytes;
use http::header::{ETAG, LAST_MODIFIED};
use http::{HeaderMap, Method, StatusCode};

use crate::constants::X_MS_BLOB_PUBLIC_ACCESS;
use crate::metadata::{self, Metadata};
use crate::request::BlobRequest;
use crate::xml::{self, ListPage};
use crate::BlobClient;

const NOT_FOUND: &[StatusCode] = &[StatusCode::NOT_FOUND];

/// Public read access of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// Containers and blobs can be listed and read anonymously.
    Container,
    /// Blobs can be read anonymously, the container can't be listed.
    Blob,
    /// No anonymous access.
    Private,
}

impl AccessLevel {
    /// Interpret the `x-ms-blob-public-access` header.
    ///
    /// The legacy `true` value means `container`. A missing or unknown value
    /// means private.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some("container") | Some("true") => AccessLevel::Container,
            Some("blob") => AccessLevel::Blob,
            _ => AccessLevel::Private,
        }
    }

    /// Value of `x-ms-blob-public-access` to send, `None` for private.
    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            AccessLevel::Container => Some("container"),
            AccessLevel::Blob => Some("blob"),
            AccessLevel::Private => None,
        }
    }

    fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_header(
            headers
                .get(X_MS_BLOB_PUBLIC_ACCESS)
                .and_then(|v| v.to_str().ok()),
        )
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header_value().unwrap_or("private"))
    }
}

/// System properties of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerProperties {
    /// Value of the `ETag` header.
    pub etag: Option<String>,
    /// Value of the `Last-Modified` header.
    pub last_modified: Option<String>,
}

fn header_string(headers: &HeaderMap, name: http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

fn with_access_level(req: BlobRequest, level: AccessLevel) -> Result<BlobRequest> {
    match level.header_value() {
        Some(v) => req.with_header(X_MS_BLOB_PUBLIC_ACCESS, v),
        None => Ok(req),
    }
}

impl BlobClient {
    /// List every container of the account in the order the service returns them.
    ///
    /// An account answering `404` has no containers yet, this returns an empty list.
    pub fn list_containers(&self) -> Result<Vec<String>> {
        let names = self.list_all(
            |marker| {
                let req = BlobRequest::account(Method::GET).with_query("comp", "list");
                Ok(match marker {
                    Some(m) => req.with_query("marker", m),
                    None => req,
                })
            },
            xml::parse_container_list,
        )?;

        Ok(names.unwrap_or_default())
    }

    /// Create a container with the given public access.
    ///
    /// Returns `false` if the container already exists.
    pub fn create_container(&self, container: &str, level: AccessLevel) -> Result<bool> {
        let req =
            BlobRequest::container(Method::PUT, container)?.with_query("restype", "container");
        let req = with_access_level(req, level)?;

        self.send_ok(&req, &[StatusCode::CONFLICT])
    }

    /// Delete a container. Returns `false` if it doesn't exist.
    pub fn delete_container(&self, container: &str) -> Result<bool> {
        let req =
            BlobRequest::container(Method::DELETE, container)?.with_query("restype", "container");

        self.send_ok(&req, NOT_FOUND)
    }

    /// Get the system properties of a container, `None` if it doesn't exist.
    pub fn get_container_properties(
        &self,
        container: &str,
    ) -> Result<Option<ContainerProperties>> {
        let req =
            BlobRequest::container(Method::GET, container)?.with_query("restype", "container");

        Ok(self.send(&req, NOT_FOUND)?.map(|resp| ContainerProperties {
            etag: header_string(resp.headers(), ETAG),
            last_modified: header_string(resp.headers(), LAST_MODIFIED),
        }))
    }

    /// Get the user defined metadata of a container, `None` if it doesn't exist.
    pub fn get_container_metadata(&self, container: &str) -> Result<Option<Metadata>> {
        let req = BlobRequest::container(Method::GET, container)?
            .with_query("restype", "container")
            .with_query("comp", "metadata");

        Ok(self
            .send(&req, NOT_FOUND)?
            .map(|resp| metadata::from_headers(resp.headers())))
    }

    /// Replace the user defined metadata of a container.
    ///
    /// Returns `false` if the container doesn't exist.
    pub fn set_container_metadata(&self, container: &str, metadata: &Metadata) -> Result<bool> {
        let req = BlobRequest::container(Method::PUT, container)?
            .with_query("restype", "container")
            .with_query("comp", "metadata");
        let req = metadata::to_headers(req, metadata)?;

        self.send_ok(&req, NOT_FOUND)
    }

    /// Get the public access level of a container, `None` if it doesn't exist.
    pub fn get_container_acl(&self, container: &str) -> Result<Option<AccessLevel>> {
        let req = acl_request(Method::GET, container)?;

        Ok(self
            .send(&req, NOT_FOUND)?
            .map(|resp| AccessLevel::from_headers(resp.headers())))
    }

    /// Set the public access level of a container.
    ///
    /// This also clears its stored access policies. Returns `false` if the
    /// container doesn't exist.
    pub fn set_container_acl(&self, container: &str, level: AccessLevel) -> Result<bool> {
        let req = with_access_level(acl_request(Method::PUT, container)?, level)?;

        self.send_ok(&req, NOT_FOUND)
    }

    /// Get the public access level and the raw `SignedIdentifiers` document
    /// of a container, `None` if it doesn't exist.
    pub fn get_container_access_policy(
        &self,
        container: &str,
    ) -> Result<Option<(AccessLevel, String)>> {
        let req = acl_request(Method::GET, container)?;

        let Some(resp) = self.send(&req, NOT_FOUND)? else {
            return Ok(None);
        };
        let level = AccessLevel::from_headers(resp.headers());
        let policy = String::from_utf8(resp.into_body().to_vec()).map_err(|e| {
            Error::unexpected("access policy is not valid utf-8").with_source(e)
        })?;

        Ok(Some((level, policy.trim_start_matches('\u{feff}').to_string())))
    }

    /// Set the public access level and the stored access policies of a container.
    ///
    /// `policy` is a `SignedIdentifiers` document sent as is. Returns `false`
    /// if the container doesn't exist.
    pub fn set_container_access_policy(
        &self,
        container: &str,
        level: AccessLevel,
        policy: &str,
    ) -> Result<bool> {
        let req = with_access_level(acl_request(Method::PUT, container)?, level)?
            .with_body(Bytes::copy_from_slice(policy.as_bytes()));

        self.send_ok(&req, NOT_FOUND)
    }

    /// List the blobs of a container including snapshots, `None` if the
    /// container doesn't exist.
    ///
    /// A blob with snapshots appears once per snapshot and once for itself.
    pub fn list_blobs(&self, container: &str) -> Result<Option<Vec<String>>> {
        self.list_all(
            |marker| {
                let req = BlobRequest::container(Method::GET, container)?
                    .with_query("restype", "container")
                    .with_query("comp", "list")
                    .with_query("include", "snapshots")
                    .with_query("include", "metadata");
                Ok(match marker {
                    Some(m) => req.with_query("marker", m),
                    None => req,
                })
            },
            xml::parse_blob_list,
        )
    }

    /// Follow `NextMarker` until the listing is complete.
    ///
    /// Returns `None` if the first page is not found. A later page that
    /// is not found fails the whole listing.
    fn list_all(
        &self,
        request: impl Fn(Option<&str>) -> Result<BlobRequest>,
        parse: impl Fn(&Bytes) -> Result<ListPage>,
    ) -> Result<Option<Vec<String>>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let req = request(marker.as_deref())?;
            let benign: &[StatusCode] = if marker.is_none() { NOT_FOUND } else { &[] };
            let Some(resp) = self.send(&req, benign)? else {
                return Ok(None);
            };

            let page = parse(resp.body())?;
            names.extend(page.names);
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => return Ok(Some(names)),
            }
        }
    }
}

fn acl_request(method: Method, container: &str) -> Result<BlobRequest> {
    Ok(BlobRequest::container(method, container)?
        .with_query("restype", "container")
        .with_query("comp", "acl"))
}
