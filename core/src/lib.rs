//! Core components for signing and sending blob storage requests.
//!
//! This crate provides the foundational types and traits shared by the blobrest crates.
//!
//! ## Overview
//!
//! - **Context**: holds the HTTP transport and environment implementations
//! - **Traits**: [`SignRequest`] for request signing, [`SigningCredential`] for credential checks
//! - **Signer**: pairs a fixed credential with a [`SignRequest`] implementation
//! - **Retry**: bounded fixed-delay retry in [`retry`]
//!
//! ## Example
//!
//! ```no_run
//! use blobrest_core::{Context, Result, Signer, SignRequest, SigningCredential};
//! use http::request::Parts;
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MySigner;
//!
//! impl SignRequest for MySigner {
//!     type Credential = MyCredential;
//!
//!     fn sign_request(&self, _: &Context, req: &mut Parts, cred: &MyCredential) -> Result<()> {
//!         req.headers.insert("x-my-key", cred.key.parse()?);
//!         Ok(())
//!     }
//! }
//!
//! # fn example() -> Result<()> {
//! let signer = Signer::new(
//!     Context::new(),
//!     MyCredential { key: "secret".to_string() },
//!     MySigner,
//! );
//!
//! let mut parts = http::Request::get("https://example.com")
//!     .body(())
//!     .unwrap()
//!     .into_parts()
//!     .0;
//! signer.sign(&mut parts)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: HTTP date formatting
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod retry;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{SignRequest, SigningCredential};
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;
