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

use std::collections::BTreeMap;

use blobrest_core::Result;
use http::HeaderMap;

use crate::constants::X_MS_META_PREFIX;
use crate::request::BlobRequest;

/// User defined metadata, keys without the `x-ms-meta-` prefix.
pub type Metadata = BTreeMap<String, String>;

/// Properties of a blob as returned in response headers, or sent verbatim as headers.
pub type Properties = BTreeMap<String, String>;

/// Collect metadata from response headers, stripping the prefix.
pub(crate) fn from_headers(headers: &HeaderMap) -> Metadata {
    properties_from_headers(headers)
        .into_iter()
        .filter_map(|(name, value)| {
            let key = name.strip_prefix(X_MS_META_PREFIX)?;
            Some((key.to_string(), value))
        })
        .collect()
}

/// Attach every metadata entry to `req` as a prefixed header.
pub(crate) fn to_headers(mut req: BlobRequest, metadata: &Metadata) -> Result<BlobRequest> {
    for (key, value) in metadata {
        req = req.with_header(&format!("{X_MS_META_PREFIX}{key}"), value)?;
    }
    Ok(req)
}

/// Collect every response header, joining repeated values with `,`.
pub(crate) fn properties_from_headers(headers: &HeaderMap) -> Properties {
    headers
        .keys()
        .map(|name| {
            let values: Vec<_> = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            (name.as_str().to_string(), values.join(","))
        })
        .collect()
}
