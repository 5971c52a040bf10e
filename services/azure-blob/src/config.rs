use std::fmt::{Debug, Formatter};
use std::time::Duration;

use blobrest_core::utils::Redact;
use blobrest_core::{Context, Result};

use crate::connection_string;

pub const AZURE_STORAGE_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";
pub const AZBLOB_ENDPOINT: &str = "AZBLOB_ENDPOINT";
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";
pub const AZBLOB_SERVICE_VERSION: &str = "AZBLOB_SERVICE_VERSION";

/// Config carries all the configuration for a blob client.
///
/// Every field is optional, [`crate::BlobClient::new`] fills the defaults and
/// rejects configs without an account name or key.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_NAME`]
    /// - connection string: `AccountName`
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_KEY`]
    /// - connection string: `AccountKey`
    pub account_key: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ENDPOINT`]
    /// - connection string: `BlobEndpoint`, or built from its parts
    ///
    /// Falls back to `https://{account_name}.blob.core.windows.net`.
    pub endpoint: Option<String>,
    /// Value of the `x-ms-version` header, `2021-12-02` by default.
    ///
    /// - env value: [`AZBLOB_SERVICE_VERSION`]
    pub service_version: Option<String>,
    /// Retries after the first attempt, 3 by default.
    pub retry_times: Option<usize>,
    /// Pause between two attempts, 200ms by default.
    pub retry_delay: Option<Duration>,
    /// Content type sent with blob data requests, `application/octet-stream` by default.
    pub content_type: Option<String>,
    /// Lease duration in seconds requested on acquire, 60 by default. `-1` means infinite.
    pub lease_duration: Option<i32>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("endpoint", &self.endpoint)
            .field("service_version", &self.service_version)
            .field("retry_times", &self.retry_times)
            .field("retry_delay", &self.retry_delay)
            .field("content_type", &self.content_type)
            .field("lease_duration", &self.lease_duration)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Fields already set are kept. The dedicated variables come next, a
    /// connection string found in [`AZURE_STORAGE_CONNECTION_STRING`] only
    /// fills what is still missing.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        if self.account_name.is_none() {
            self.account_name = ctx.env_var(AZBLOB_ACCOUNT_NAME);
        }
        if self.account_key.is_none() {
            self.account_key = ctx.env_var(AZBLOB_ACCOUNT_KEY);
        }
        if self.endpoint.is_none() {
            self.endpoint = ctx.env_var(AZBLOB_ENDPOINT);
        }
        if self.service_version.is_none() {
            self.service_version = ctx.env_var(AZBLOB_SERVICE_VERSION);
        }

        if let Some(v) = ctx.env_var(AZURE_STORAGE_CONNECTION_STRING) {
            self = self.merge(connection_string::parse(&v)?);
        }

        Ok(self)
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The connection string doesn't have to specify all required parameters
    /// because the user is still allowed to set them later directly on the object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Fill unset fields from `other`.
    fn merge(mut self, other: Config) -> Self {
        self.account_name = self.account_name.or(other.account_name);
        self.account_key = self.account_key.or(other.account_key);
        self.endpoint = self.endpoint.or(other.endpoint);
        self.service_version = self.service_version.or(other.service_version);
        self.retry_times = self.retry_times.or(other.retry_times);
        self.retry_delay = self.retry_delay.or(other.retry_delay);
        self.content_type = self.content_type.or(other.content_type);
        self.lease_duration = self.lease_duration.or(other.lease_duration);
        self
    }
}
