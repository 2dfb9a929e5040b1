//! AWS Route 53 Provider

mod error;
mod http;
mod provider;
mod sign;
/// XML document decoding and request body encoding.
pub(crate) mod xml;

use std::time::Duration;

use reqwest::{Client, Url};

use crate::config::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_REGION,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::error::{DnsError, Result};
use crate::providers::common::create_http_client;

/// Signing service name.
pub(crate) const ROUTE53_SERVICE: &str = "route53";

/// Route 53 REST/XML API client.
///
/// Authenticates with AWS Signature Version 4. Read requests are retried on
/// transient failures; change submissions and zone creation are sent once.
///
/// # Construction
///
/// ```rust,no_run
/// use nice_dns_provider::Route53Api;
///
/// let api = Route53Api::builder(
///     "your-access-key-id".to_string(),
///     "your-secret-access-key".to_string(),
/// )
/// .max_retries(3)
/// .build()
/// .unwrap();
/// ```
pub struct Route53Api {
    pub(crate) client: Client,
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key: String,
    pub(crate) session_token: Option<String>,
    /// Endpoint base URL without trailing slash.
    pub(crate) endpoint: String,
    /// `Host` header value (host, plus port when not the scheme default).
    pub(crate) host: String,
    pub(crate) region: String,
    pub(crate) max_retries: u32,
}

/// Builder for [`Route53Api`].
pub struct Route53ApiBuilder {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    endpoint: String,
    region: String,
    max_retries: u32,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl Route53ApiBuilder {
    fn new(access_key_id: String, secret_access_key: String) -> Self {
        Self {
            access_key_id,
            secret_access_key,
            session_token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Temporary-credential session token, sent as `X-Amz-Security-Token`.
    pub fn session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    /// API base URL (default: `https://route53.amazonaws.com`).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Signing region (default: `us-east-1`).
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the maximum number of automatic retries for transient errors of
    /// read requests (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the [`Route53Api`] instance.
    pub fn build(self) -> Result<Route53Api> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| DnsError::invalid_request("endpoint", e.to_string()))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(DnsError::invalid_request(
                    "endpoint",
                    format!("no host in {}", self.endpoint),
                ));
            }
        };

        Ok(Route53Api {
            client: create_http_client(ROUTE53_SERVICE, self.connect_timeout, self.request_timeout)?,
            access_key_id: self.access_key_id,
            secret_access_key: self.secret_access_key,
            session_token: self.session_token,
            endpoint: self.endpoint.trim_end_matches('/').to_string(),
            host,
            region: self.region,
            max_retries: self.max_retries,
        })
    }
}

impl Route53Api {
    /// Creates a client with default settings.
    pub fn new(access_key_id: String, secret_access_key: String) -> Result<Self> {
        Self::builder(access_key_id, secret_access_key).build()
    }

    /// Returns a builder for customizing the client configuration.
    pub fn builder(access_key_id: String, secret_access_key: String) -> Route53ApiBuilder {
        Route53ApiBuilder::new(access_key_id, secret_access_key)
    }
}
