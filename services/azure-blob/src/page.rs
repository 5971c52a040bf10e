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

use blobrest_core::{Error, Result};
use bytes::Bytes;
use http::Method;

use crate::blob::NOT_FOUND_OR_CONFLICT;
use crate::constants::*;
use crate::request::BlobRequest;
use crate::{xml, BlobClient};

/// A written region of a page blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    /// First byte of the range.
    pub offset: u64,
    /// Number of bytes in the range.
    pub length: u64,
}

impl PageRange {
    /// Create a new page range.
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Last byte of the range, inclusive.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length.saturating_sub(1))
    }

    /// Value of the `x-ms-range` header addressing this range.
    pub fn to_header(&self) -> String {
        format!("bytes={}-{}", self.offset, self.end())
    }

    /// A non-empty range whose last byte fits in `u64`.
    fn checked(offset: u64, length: u64) -> Result<Self> {
        if length == 0 {
            return Err(Error::request_invalid("page range must not be empty"));
        }
        if offset.checked_add(length - 1).is_none() {
            return Err(Error::request_invalid(format!(
                "page range {offset}+{length} overflows"
            )));
        }
        Ok(Self::new(offset, length))
    }

    fn aligned(offset: u64, length: u64) -> Result<Self> {
        let range = Self::checked(offset, length)?;
        if offset % PAGE_SIZE != 0 || length % PAGE_SIZE != 0 {
            return Err(Error::request_invalid(format!(
                "page range {offset}+{length} is not aligned to {PAGE_SIZE} bytes"
            )));
        }
        Ok(range)
    }
}

impl BlobClient {
    /// Read `size` bytes of a blob starting at `offset`.
    pub fn get_page(
        &self,
        container: &str,
        blob: &str,
        offset: u64,
        size: u64,
    ) -> Result<Option<Bytes>> {
        let range = PageRange::checked(offset, size)?;
        let req = BlobRequest::blob(Method::GET, container, blob)?
            .with_header(X_MS_RANGE, &range.to_header())?;

        Ok(self
            .send(&req, NOT_FOUND_OR_CONFLICT)?
            .map(http::Response::into_body))
    }

    /// Write `content` into a page blob at `offset`.
    ///
    /// Both the offset and the content length must be multiples of 512.
    pub fn put_page(
        &self,
        container: &str,
        blob: &str,
        offset: u64,
        content: impl Into<Bytes>,
    ) -> Result<bool> {
        let content = content.into();
        let range = PageRange::aligned(offset, content.len() as u64)?;
        let req = BlobRequest::blob(Method::PUT, container, blob)?
            .with_query("comp", "page")
            .with_header(X_MS_PAGE_WRITE, "update")?
            .with_header(X_MS_RANGE, &range.to_header())?
            .with_body(content);

        self.send_ok(&req, NOT_FOUND_OR_CONFLICT)
    }

    /// List the written ranges of a page blob.
    pub fn get_page_ranges(&self, container: &str, blob: &str) -> Result<Option<Vec<PageRange>>> {
        let req = BlobRequest::blob(Method::GET, container, blob)?.with_query("comp", "pagelist");

        self.send(&req, NOT_FOUND_OR_CONFLICT)?
            .map(|resp| xml::parse_page_list(resp.body()))
            .transpose()
    }
}
