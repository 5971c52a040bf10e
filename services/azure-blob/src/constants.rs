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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in blob services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_BLOB_TYPE: &str = "x-ms-blob-type";
pub const X_MS_BLOB_CONTENT_LENGTH: &str = "x-ms-blob-content-length";
pub const X_MS_BLOB_PUBLIC_ACCESS: &str = "x-ms-blob-public-access";
pub const X_MS_RANGE: &str = "x-ms-range";
pub const X_MS_PAGE_WRITE: &str = "x-ms-page-write";
pub const X_MS_COPY_SOURCE: &str = "x-ms-copy-source";
pub const X_MS_LEASE_ACTION: &str = "x-ms-lease-action";
pub const X_MS_LEASE_ID: &str = "x-ms-lease-id";
pub const X_MS_LEASE_DURATION: &str = "x-ms-lease-duration";
pub const CONTENT_MD5: &str = "content-md5";
pub const X_MS_ERROR_CODE: &str = "x-ms-error-code";

/// Prefix of every header taking part in the canonicalized headers string.
pub const X_MS_PREFIX: &str = "x-ms-";
/// Prefix of user defined metadata headers.
pub const X_MS_META_PREFIX: &str = "x-ms-meta-";

/// Authorization scheme of shared key signatures.
pub const SHARED_KEY_SCHEME: &str = "SharedKey";

pub const DEFAULT_SERVICE_VERSION: &str = "2021-12-02";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
pub const DEFAULT_LEASE_DURATION: i32 = 60;
pub const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// From this version on, a zero Content-Length is signed as an empty string.
pub const EMPTY_ZERO_LENGTH_SINCE: &str = "2015-02-21";
/// From this version on, `x-ms-copy-source` must be a full URL.
pub const COPY_SOURCE_URL_SINCE: &str = "2012-02-12";

/// Page blobs are written and sized in units of this many bytes.
pub const PAGE_SIZE: u64 = 512;

/// Characters kept verbatim in blob paths and query values.
pub static AZURE_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b'~');
