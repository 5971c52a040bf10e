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

use anyhow::Result;
use blobrest_azure_blob::{AccessLevel, Config, ContainerProperties, Metadata};
use blobrest_core::ErrorKind;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;

use crate::mock::{client, client_with, MockHttpSend, ACCOUNT_KEY, ACCOUNT_NAME};

const TWO_CONTAINERS: &str = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\
    <EnumerationResults ServiceEndpoint=\"https://demo.blob.core.windows.net/\">\
    <Containers>\
    <Container><Name>photos</Name></Container>\
    <Container><Name>videos</Name></Container>\
    </Containers>\
    <NextMarker />\
    </EnumerationResults>";

#[test]
fn test_list_containers_not_found_is_empty() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(404, &[], "");

    assert_eq!(client(&mock).list_containers()?, Vec::<String>::new());

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, Method::GET);
    assert_eq!(reqs[0].uri, "https://demo.blob.core.windows.net/?comp=list");
    Ok(())
}

#[test]
fn test_list_containers_in_document_order() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(200, &[], TWO_CONTAINERS);

    assert_eq!(client(&mock).list_containers()?, vec!["photos", "videos"]);

    let req = &mock.requests()[0];
    assert_eq!(
        req.header("authorization"),
        Some(req.expected_authorization(ACCOUNT_NAME, ACCOUNT_KEY)?.as_str())
    );
    Ok(())
}

#[test]
fn test_list_containers_follows_next_marker() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(
        200,
        &[],
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <EnumerationResults><Containers>\
         <Container><Name>archive</Name></Container>\
         </Containers><NextMarker>/demo/photos</NextMarker></EnumerationResults>",
    )
    .respond(200, &[], TWO_CONTAINERS);

    assert_eq!(
        client(&mock).list_containers()?,
        vec!["archive", "photos", "videos"]
    );

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(
        reqs[1].uri,
        "https://demo.blob.core.windows.net/?comp=list&marker=/demo/photos"
    );
    Ok(())
}

#[test]
fn test_create_container() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(201, &[], "").respond(409, &[], "");
    let client = client(&mock);

    assert!(client.create_container("photos", AccessLevel::Private)?);
    assert!(!client.create_container("photos", AccessLevel::Blob)?);

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].method, Method::PUT);
    assert_eq!(
        reqs[0].uri,
        "https://demo.blob.core.windows.net/photos?restype=container"
    );
    assert_eq!(reqs[0].header("x-ms-blob-public-access"), None);
    assert_eq!(reqs[0].header("content-type"), None);
    assert_eq!(reqs[1].header("x-ms-blob-public-access"), Some("blob"));
    Ok(())
}

#[test]
fn test_delete_container() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(202, &[], "").respond(404, &[], "");
    let client = client(&mock);

    assert!(client.delete_container("photos")?);
    assert!(!client.delete_container("photos")?);
    assert_eq!(mock.requests()[0].method, Method::DELETE);
    Ok(())
}

#[test]
fn test_container_properties() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(
        200,
        &[
            ("etag", "\"0x8D\""),
            ("last-modified", "Sun, 06 Nov 1994 08:49:37 GMT"),
        ],
        "",
    )
    .respond(404, &[], "");
    let client = client(&mock);

    assert_eq!(
        client.get_container_properties("photos")?,
        Some(ContainerProperties {
            etag: Some("\"0x8D\"".to_string()),
            last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT".to_string()),
        })
    );
    assert_eq!(client.get_container_properties("photos")?, None);
    Ok(())
}

#[test]
fn test_container_metadata_round_trip() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(200, &[], "").respond(
        200,
        &[
            ("x-ms-meta-owner", "alice"),
            ("x-ms-request-id", "42"),
            ("etag", "\"0x8D\""),
        ],
        "",
    );
    let client = client(&mock);

    let metadata = Metadata::from([("owner".to_string(), "alice".to_string())]);
    assert!(client.set_container_metadata("photos", &metadata)?);
    assert_eq!(client.get_container_metadata("photos")?, Some(metadata));

    let reqs = mock.requests();
    assert_eq!(
        reqs[0].uri,
        "https://demo.blob.core.windows.net/photos?restype=container&comp=metadata"
    );
    assert_eq!(reqs[0].header("x-ms-meta-owner"), Some("alice"));
    Ok(())
}

#[test]
fn test_container_acl() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(200, &[("x-ms-blob-public-access", "true")], "")
        .respond(200, &[], "")
        .respond(404, &[], "")
        .respond(200, &[], "")
        .respond(200, &[], "");
    let client = client(&mock);

    assert_eq!(
        client.get_container_acl("photos")?,
        Some(AccessLevel::Container)
    );
    assert_eq!(client.get_container_acl("photos")?, Some(AccessLevel::Private));
    assert_eq!(client.get_container_acl("photos")?, None);

    assert!(client.set_container_acl("photos", AccessLevel::Private)?);
    assert!(client.set_container_acl("photos", AccessLevel::Container)?);

    let reqs = mock.requests();
    assert_eq!(
        reqs[0].uri,
        "https://demo.blob.core.windows.net/photos?restype=container&comp=acl"
    );
    assert_eq!(reqs[3].method, Method::PUT);
    assert_eq!(reqs[3].header("x-ms-blob-public-access"), None);
    assert_eq!(reqs[4].header("x-ms-blob-public-access"), Some("container"));
    Ok(())
}

#[test]
fn test_container_access_policy() -> Result<()> {
    let policy = "<?xml version=\"1.0\" encoding=\"utf-8\"?><SignedIdentifiers />";
    let mock = MockHttpSend::new();
    mock.respond(200, &[("x-ms-blob-public-access", "blob")], policy)
        .respond(200, &[], "");
    let client = client(&mock);

    assert_eq!(
        client.get_container_access_policy("photos")?,
        Some((AccessLevel::Blob, policy.to_string()))
    );
    assert!(client.set_container_access_policy("photos", AccessLevel::Blob, policy)?);

    let reqs = mock.requests();
    assert_eq!(reqs[1].body.as_ref(), policy.as_bytes());
    assert_eq!(reqs[1].header("accept-charset"), Some("UTF-8"));
    assert_eq!(reqs[1].header("x-ms-blob-public-access"), Some("blob"));
    Ok(())
}

#[test]
fn test_list_blobs() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(
        200,
        &[],
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <EnumerationResults ContainerName=\"photos\"><Blobs>\
         <Blob><Name>cat.jpg</Name><Snapshot>2024-01-01T00:00:00.0000000Z</Snapshot></Blob>\
         <Blob><Name>cat.jpg</Name></Blob>\
         <Blob><Name>dog.jpg</Name><Metadata><owner>bob</owner></Metadata></Blob>\
         </Blobs><NextMarker /></EnumerationResults>",
    )
    .respond(404, &[], "");
    let client = client(&mock);

    assert_eq!(
        client.list_blobs("photos")?,
        Some(vec![
            "cat.jpg".to_string(),
            "cat.jpg".to_string(),
            "dog.jpg".to_string()
        ])
    );
    assert_eq!(client.list_blobs("missing")?, None);

    let req = &mock.requests()[0];
    assert_eq!(
        req.uri,
        "https://demo.blob.core.windows.net/photos?restype=container&comp=list&include=snapshots&include=metadata"
    );
    assert_eq!(
        req.header("authorization"),
        Some(req.expected_authorization(ACCOUNT_NAME, ACCOUNT_KEY)?.as_str())
    );
    Ok(())
}

#[test]
fn test_list_blobs_fails_when_later_page_is_missing() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.respond(
        200,
        &[],
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <EnumerationResults ContainerName=\"photos\"><Blobs>\
         <Blob><Name>a.jpg</Name></Blob>\
         </Blobs><NextMarker>m2</NextMarker></EnumerationResults>",
    )
    .respond(404, &[("x-ms-error-code", "ContainerNotFound")], "");
    let client = client_with(
        &mock,
        Config {
            retry_times: Some(0),
            ..Default::default()
        },
    );

    let err = client.list_blobs("photos").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceFailed);
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 2);
    assert!(reqs[1].uri.ends_with("&marker=m2"));
    Ok(())
}
