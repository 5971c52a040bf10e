//! Blocking [`HttpSend`] implementation backed by `reqwest`.

use blobrest_core::{Error, HttpSend, Result};
use bytes::Bytes;
use reqwest::blocking::{Client, Request};

/// ReqwestHttpSend sends requests through a blocking [`reqwest::blocking::Client`].
///
/// The response body is always read to the end before returning, so the
/// connection goes back to the pool whatever the status.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::blocking::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl HttpSend for ReqwestHttpSend {
    fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req.map(|body| body.to_vec())).map_err(|e| {
            Error::request_invalid("failed to convert request").with_source(anyhow::Error::new(e))
        })?;

        let resp = self.client.execute(req).map_err(|e| {
            Error::unexpected("failed to send request").with_source(anyhow::Error::new(e))
        })?;

        let status = resp.status();
        let version = resp.version();
        let headers = resp.headers().clone();
        let body = resp.bytes().map_err(|e| {
            Error::unexpected("failed to read response body").with_source(anyhow::Error::new(e))
        })?;

        let mut out = http::Response::new(body);
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
