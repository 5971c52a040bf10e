use std::fmt::Write;

use blobrest_core::hash::base64_hmac_sha256;
use blobrest_core::time::{format_http_date, now, DateTime};
use blobrest_core::{Context, Result, SignRequest, SigningRequest};
use http::request::Parts;
use http::{header, HeaderName, HeaderValue, Method};
use log::debug;
use percent_encoding::utf8_percent_encode;

use crate::constants::*;
use crate::Credential;

/// RequestSigner implements Azure Storage Shared Key Authorization.
///
/// Requests already carrying `x-ms-date` are signed with that date, the
/// signing time is only used to fill it when absent.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new shared key signer.
    pub fn new() -> Self {
        Self { time: None }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(&self, _: &Context, req: &mut Parts, cred: &Credential) -> Result<()> {
        let mut ctx = SigningRequest::build(req)?;

        if !ctx.headers.contains_key(X_MS_DATE) {
            let now_time = self.time.unwrap_or_else(now);
            ctx.headers
                .insert(X_MS_DATE, format_http_date(now_time).parse()?);
        }

        let signature = signature(&ctx, cred)?;
        ctx.headers.insert(header::AUTHORIZATION, {
            let mut value: HeaderValue =
                format!("{SHARED_KEY_SCHEME} {}:{signature}", cred.account_name).parse()?;
            value.set_sensitive(true);
            value
        });

        // Query values were decoded for signing, encode them again for the wire.
        for (_, v) in ctx.query.iter_mut() {
            *v = utf8_percent_encode(v, &AZURE_URI_ENCODE_SET).to_string();
        }

        ctx.apply(req)
    }
}

/// Compute the base64 encoded shared key signature of a request.
///
/// This is a pure function of the request and the credential.
pub fn signature(ctx: &SigningRequest, cred: &Credential) -> Result<String> {
    let string_to_sign = string_to_sign(ctx, &cred.account_name)?;
    let key = cred.decoded_key()?;

    Ok(base64_hmac_sha256(&key, string_to_sign.as_bytes()))
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders + "\n" +
/// CanonicalizedResource;
/// ```
///
/// Missing headers contribute an empty line. A zero `Content-Length` is
/// signed as empty for `x-ms-version` 2015-02-21 and later, and for bodiless
/// `GET` and `HEAD` requests of any version.
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
pub fn string_to_sign(ctx: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(256);

    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_ENCODING)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_LANGUAGE)?)?;
    writeln!(&mut s, "{}", content_length(ctx)?)?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::DATE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_NONE_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::RANGE)?)?;
    writeln!(&mut s, "{}", canonicalize_headers(ctx)?)?;
    write!(&mut s, "{}", canonicalize_resource(ctx, account_name))?;

    debug!("string to sign: {}", &s);

    Ok(s)
}

fn content_length(ctx: &SigningRequest) -> Result<&str> {
    let content_length = ctx.header_get_or_default(&header::CONTENT_LENGTH)?;
    if content_length != "0" {
        return Ok(content_length);
    }

    let version = ctx.header_get_or_default(&HeaderName::from_static(X_MS_VERSION))?;
    let omit_zero = (!version.is_empty() && version >= EMPTY_ZERO_LENGTH_SINCE)
        || ctx.method == Method::GET
        || ctx.method == Method::HEAD;

    Ok(if omit_zero { "" } else { content_length })
}

/// Build the canonicalized headers string from every `x-ms-` header.
///
/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
pub fn canonicalize_headers(ctx: &SigningRequest) -> Result<String> {
    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_prefix(X_MS_PREFIX)?,
        ":",
        "\n",
    ))
}

/// Build the canonicalized resource string: `/account/path` followed by
/// one `name:value` line per distinct query parameter.
///
/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
pub fn canonicalize_resource(ctx: &SigningRequest, account_name: &str) -> String {
    if ctx.query.is_empty() {
        return format!("/{}{}", account_name, ctx.path);
    }

    format!(
        "/{}{}\n{}",
        account_name,
        ctx.path,
        SigningRequest::query_to_string(ctx.query_to_vec_lowercase_merged(), ":", "\n")
    )
}
