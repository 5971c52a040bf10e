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

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use blobrest_core::hash::base64_encode;
use blobrest_core::{Error, Result};
use bytes::Bytes;
use http::Method;

use crate::blob::NOT_FOUND_OR_CONFLICT;
use crate::request::BlobRequest;
use crate::{xml, BlobClient};

/// BlockId names one uploaded block of a block blob.
///
/// The service requires every id of a blob to have the same length, ids
/// built by [`BlockId::from_index`] always do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(String);

impl BlockId {
    /// Base64 of the index as 4 little endian bytes: `0` is `AAAAAA==`, `1` is `AQAAAA==`.
    pub fn from_index(index: u32) -> Self {
        Self(base64_encode(&index.to_le_bytes()))
    }

    /// The encoded id, as sent to the service.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl BlobClient {
    /// Upload one uncommitted block of a block blob.
    pub fn put_block(
        &self,
        container: &str,
        blob: &str,
        id: &BlockId,
        content: impl Into<Bytes>,
    ) -> Result<bool> {
        let req = BlobRequest::blob(Method::PUT, container, blob)?
            .with_query("comp", "block")
            .with_query("blockid", id.as_str())
            .with_body(content);

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }

    /// List the blocks of a blob, committed ones first, each group in the
    /// order the service returns it.
    pub fn get_block_list(&self, container: &str, blob: &str) -> Result<Option<Vec<BlockId>>> {
        let req = BlobRequest::blob(Method::GET, container, blob)?
            .with_query("comp", "blocklist")
            .with_query("blocklisttype", "all");

        self.send(&req, NOT_FOUND_OR_CONFLICT)?
            .map(|resp| xml::parse_block_list(resp.body()))
            .transpose()
    }

    /// Commit `ids`, in this order, as the content of a blob.
    ///
    /// Every id must be unique and have been uploaded with [`Self::put_block`].
    pub fn put_block_list(&self, container: &str, blob: &str, ids: &[BlockId]) -> Result<bool> {
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(dup) = ids.iter().find(|id| !seen.insert(*id)) {
            return Err(Error::request_invalid(format!(
                "block id {dup} appears more than once in the block list"
            )));
        }

        let req = BlobRequest::blob(Method::PUT, container, blob)?
            .with_query("comp", "blocklist")
            .with_body(xml::block_list_body(ids));

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }
}
