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

use bytes::Bytes;
use http::header::{ACCEPT_CHARSET, CONTENT_LENGTH, CONTENT_TYPE, IF_MATCH};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use percent_encoding::utf8_percent_encode;

use blobrest_core::time::{format_http_date, DateTime};
use blobrest_core::{Error, Result};

use crate::constants::*;

/// What a request addresses, decides whether a content type is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Account or container level requests, sent without content type.
    Container,
    /// Requests on blob data, sent with the configured content type.
    BlobData,
}

/// BlobRequest describes one REST call before it is turned into HTTP.
///
/// Names and headers are checked while the descriptor is built, so a
/// malformed request fails before any attempt is made.
#[derive(Debug, Clone)]
pub struct BlobRequest {
    method: Method,
    kind: OperationKind,
    container: Option<String>,
    blob: Option<String>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
    if_match: Option<HeaderValue>,
    content_md5: Option<HeaderValue>,
}

impl BlobRequest {
    /// Request on the account itself, like listing containers.
    pub fn account(method: Method) -> Self {
        Self {
            method,
            kind: OperationKind::Container,
            container: None,
            blob: None,
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            if_match: None,
            content_md5: None,
        }
    }

    /// Request on a container.
    pub fn container(method: Method, container: &str) -> Result<Self> {
        validate_container(container)?;

        let mut req = Self::account(method);
        req.container = Some(container.to_string());
        Ok(req)
    }

    /// Request on a blob inside a container.
    pub fn blob(method: Method, container: &str, blob: &str) -> Result<Self> {
        if blob.is_empty() {
            return Err(Error::request_invalid("blob name must not be empty"));
        }

        let mut req = Self::container(method, container)?;
        req.kind = OperationKind::BlobData;
        req.blob = Some(blob.to_string());
        Ok(req)
    }

    /// Override the operation kind.
    pub fn with_kind(mut self, kind: OperationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Append a query parameter, the value is encoded while building.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append an extra header. Repeated names keep every value.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::request_invalid(format!("invalid header name: {name}")).with_source(e)
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::request_invalid(format!("invalid value for header {name}")).with_source(e)
        })?;

        self.headers.append(name, value);
        Ok(self)
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Only apply the request if the resource still has this ETag.
    pub fn with_if_match(mut self, etag: &str) -> Result<Self> {
        self.if_match = Some(HeaderValue::from_str(etag).map_err(|e| {
            Error::request_invalid("invalid etag for If-Match").with_source(e)
        })?);
        Ok(self)
    }

    /// Attach the base64 encoded MD5 of the body.
    pub fn with_content_md5(mut self, md5: &str) -> Result<Self> {
        self.content_md5 = Some(HeaderValue::from_str(md5).map_err(|e| {
            Error::request_invalid("invalid Content-MD5 value").with_source(e)
        })?);
        Ok(self)
    }

    /// HTTP method of this request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Kind of this request.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Body of this request.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Percent encoded resource path, `/` for account level requests.
    pub fn path(&self) -> String {
        let mut path = String::from("/");
        if let Some(container) = &self.container {
            path.push_str(&utf8_percent_encode(container, &AZURE_URI_ENCODE_SET).to_string());
        }
        if let Some(blob) = &self.blob {
            path.push('/');
            path.push_str(&utf8_percent_encode(blob, &AZURE_URI_ENCODE_SET).to_string());
        }
        path
    }
}

fn validate_container(container: &str) -> Result<()> {
    if container.is_empty() {
        return Err(Error::request_invalid("container name must not be empty"));
    }
    if container.contains('/') {
        return Err(Error::request_invalid(format!(
            "container name must not contain '/': {container}"
        )));
    }
    Ok(())
}

/// RequestBuilder turns a [`BlobRequest`] into an unsigned HTTP request.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: String,
    service_version: HeaderValue,
    content_type: HeaderValue,
}

impl RequestBuilder {
    /// Create a builder for the given endpoint and service version.
    pub fn new(endpoint: &str, service_version: &str, content_type: &str) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        let uri: Uri = endpoint.parse().map_err(|e| {
            Error::config_invalid(format!("invalid endpoint: {endpoint}")).with_source(e)
        })?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(Error::config_invalid(format!(
                "endpoint must carry scheme and host: {endpoint}"
            )));
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            service_version: HeaderValue::from_str(service_version).map_err(|e| {
                Error::config_invalid(format!("invalid service version: {service_version}"))
                    .with_source(e)
            })?,
            content_type: HeaderValue::from_str(content_type).map_err(|e| {
                Error::config_invalid(format!("invalid content type: {content_type}"))
                    .with_source(e)
            })?,
        })
    }

    /// Endpoint without trailing `/`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Service version sent with every request.
    pub fn service_version(&self) -> &str {
        self.service_version.to_str().unwrap_or_default()
    }

    /// Build the HTTP request dated at `time`.
    pub fn build(&self, req: &BlobRequest, time: DateTime) -> Result<http::Request<Bytes>> {
        let mut uri = format!("{}{}", self.endpoint, req.path());
        for (idx, (k, v)) in req.query.iter().enumerate() {
            uri.push(if idx == 0 { '?' } else { '&' });
            uri.push_str(&utf8_percent_encode(k, &AZURE_URI_ENCODE_SET).to_string());
            if !v.is_empty() {
                uri.push('=');
                uri.push_str(&utf8_percent_encode(v, &AZURE_URI_ENCODE_SET).to_string());
            }
        }

        let mut out = http::Request::new(req.body.clone());
        *out.method_mut() = req.method.clone();
        *out.uri_mut() = uri.parse()?;

        let headers = out.headers_mut();
        headers.insert(X_MS_DATE, format_http_date(time).parse()?);
        headers.insert(X_MS_VERSION, self.service_version.clone());
        headers.insert(CONTENT_LENGTH, HeaderValue::from(req.body.len()));
        if req.kind == OperationKind::BlobData && !req.headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, self.content_type.clone());
        }
        if !req.body.is_empty() {
            headers.insert(ACCEPT_CHARSET, HeaderValue::from_static("UTF-8"));
        }
        if let Some(etag) = &req.if_match {
            headers.insert(IF_MATCH, etag.clone());
        }
        if let Some(md5) = &req.content_md5 {
            headers.insert(CONTENT_MD5, md5.clone());
        }
        for (name, value) in req.headers.iter() {
            headers.append(name.clone(), value.clone());
        }

        Ok(out)
    }
}
