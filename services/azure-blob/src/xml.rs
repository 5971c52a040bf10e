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

//! XML bodies exchanged with the blob service.

use bytes::Bytes;
use quick_xml::de;
use quick_xml::escape::escape;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use blobrest_core::{Error, Result};

use crate::{BlockId, PageRange};

/// One page of a listing: the names found and the marker of the next page.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ListPage {
    pub names: Vec<String>,
    pub next_marker: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ContainerEnumeration {
    containers: Containers,
    next_marker: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
struct Containers {
    #[serde(rename = "Container", default)]
    items: Vec<Named>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BlobEnumeration {
    blobs: Blobs,
    next_marker: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
struct Blobs {
    #[serde(rename = "Blob", default)]
    items: Vec<Named>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Named {
    name: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BlockList {
    committed_blocks: Blocks,
    uncommitted_blocks: Blocks,
}

#[derive(Default, Debug, Deserialize)]
struct Blocks {
    #[serde(rename = "Block", default)]
    items: Vec<Named>,
}

#[derive(Default, Debug, Deserialize)]
struct PageList {
    #[serde(rename = "PageRange", default)]
    ranges: Vec<RawPageRange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPageRange {
    start: u64,
    end: u64,
}

fn parse<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    let content = std::str::from_utf8(body)
        .map_err(|e| Error::unexpected("response body is not valid utf-8").with_source(e))?;
    // The service prefixes its documents with a byte order mark.
    let content = content.trim_start_matches('\u{feff}');

    de::from_str(content)
        .map_err(|e| Error::unexpected("failed to parse xml response").with_source(e))
}

fn next_marker(marker: Option<String>) -> Option<String> {
    marker.filter(|m| !m.trim().is_empty())
}

/// Parse an `EnumerationResults` document of a container listing.
pub(crate) fn parse_container_list(body: &Bytes) -> Result<ListPage> {
    let v: ContainerEnumeration = parse(body)?;

    Ok(ListPage {
        names: v.containers.items.into_iter().map(|c| c.name).collect(),
        next_marker: next_marker(v.next_marker),
    })
}

/// Parse an `EnumerationResults` document of a blob listing.
pub(crate) fn parse_blob_list(body: &Bytes) -> Result<ListPage> {
    let v: BlobEnumeration = parse(body)?;

    Ok(ListPage {
        names: v.blobs.items.into_iter().map(|b| b.name).collect(),
        next_marker: next_marker(v.next_marker),
    })
}

/// Parse a `BlockList` document, committed blocks first.
pub(crate) fn parse_block_list(body: &Bytes) -> Result<Vec<BlockId>> {
    let v: BlockList = parse(body)?;

    Ok(v.committed_blocks
        .items
        .into_iter()
        .chain(v.uncommitted_blocks.items)
        .map(|b| BlockId::from(b.name))
        .collect())
}

/// Parse a `PageList` document.
pub(crate) fn parse_page_list(body: &Bytes) -> Result<Vec<PageRange>> {
    let v: PageList = parse(body)?;

    v.ranges
        .into_iter()
        .map(|r| {
            if r.end < r.start {
                return Err(Error::unexpected(format!(
                    "invalid page range: {}-{}",
                    r.start, r.end
                )));
            }
            Ok(PageRange::new(r.start, r.end - r.start + 1))
        })
        .collect()
}

/// Build the body committing `ids` as the blob content, in order.
pub(crate) fn block_list_body(ids: &[BlockId]) -> String {
    let mut s = String::from(r#"<?xml version="1.0" encoding="utf-8"?><BlockList>"#);
    for id in ids {
        s.push_str("<Latest>");
        s.push_str(&escape(id.as_str()));
        s.push_str("</Latest>");
    }
    s.push_str("</BlockList>");
    s
}
