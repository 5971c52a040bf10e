//! Azure Blob Storage client built on shared key signing.
//!
//! This crate provides:
//! - [`RequestSigner`]: Shared Key authorization for blob service requests
//! - [`BlobClient`]: container and blob operations, every call retried by a
//!   [`blobrest_core::retry::Retry`] executor
//! - [`Config`]: account settings from code, env or a connection string
//!
//! Statuses an operation expects, like `404` for a missing blob or `409` for
//! an existing container, come back as `false` or `None`. Every other failure
//! is retried and finally returned as an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use blobrest_azure_blob::{AccessLevel, BlobClient, Config};
//! use blobrest_core::{Context, OsEnv, Result};
//! use blobrest_http_send_reqwest::ReqwestHttpSend;
//!
//! fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let config = Config::default().from_env(&ctx)?;
//!     let client = BlobClient::new(ctx, config)?;
//!
//!     client.create_container("photos", AccessLevel::Private)?;
//!     client.put_blob("photos", "cat.jpg", b"meow".to_vec())?;
//!
//!     if let Some(content) = client.get_blob("photos", "cat.jpg")? {
//!         println!("read {} bytes", content.len());
//!     }
//!     Ok(())
//! }
//! ```

mod constants;

mod config;
pub use config::Config;
mod connection_string;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{
    canonicalize_headers, canonicalize_resource, signature, string_to_sign, RequestSigner,
};

mod request;
pub use request::{BlobRequest, OperationKind, RequestBuilder};

mod client;
pub use client::BlobClient;

mod metadata;
pub use metadata::{Metadata, Properties};

mod container;
pub use container::{AccessLevel, ContainerProperties};
mod blob;
pub use blob::LeaseAction;
mod block;
pub use block::BlockId;
mod page;
pub use page::PageRange;

mod xml;
