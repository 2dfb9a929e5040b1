//! Client configuration
//!
//! Everything a client needs is held in one [`ClientConfig`] value that is
//! moved into the client at construction. Nothing is read from the process
//! environment after that.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ProviderCredentials;

/// Default Route 53 API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://route53.amazonaws.com";
/// Route 53 is a global service signed against this region.
pub const DEFAULT_REGION: &str = "us-east-1";
/// 默认重试次数（仅用于幂等的读请求）
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// 默认连接超时（秒）
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable names read by [`ClientConfig::from_env`].
pub mod env_vars {
    pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    pub const SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
    pub const ENDPOINT: &str = "NICE_DNS_ENDPOINT";
    pub const REGION: &str = "NICE_DNS_REGION";
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

const fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

const fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Configuration owned by one client instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub credentials: ProviderCredentials,
    /// Base URL of the provider API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Signing region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Automatic retries for transient failures of read requests. Writes are
    /// never retried.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Configuration with default endpoint, region, retries and timeouts.
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self {
            credentials,
            endpoint: default_endpoint(),
            region: default_region(),
            max_retries: DEFAULT_MAX_RETRIES,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Build from the standard AWS credential variables, with optional
    /// `NICE_DNS_ENDPOINT` / `NICE_DNS_REGION` overrides.
    #[cfg(feature = "route53")]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(feature = "route53")]
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        use crate::error::DnsError;

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            non_empty(key).ok_or_else(|| {
                DnsError::invalid_request(key, "environment variable is not set")
            })
        };

        let credentials = ProviderCredentials::Route53 {
            access_key_id: required(env_vars::ACCESS_KEY_ID)?,
            secret_access_key: required(env_vars::SECRET_ACCESS_KEY)?,
            session_token: non_empty(env_vars::SESSION_TOKEN),
        };

        let mut config = Self::new(credentials);
        if let Some(endpoint) = non_empty(env_vars::ENDPOINT) {
            config.endpoint = endpoint;
        }
        if let Some(region) = non_empty(env_vars::REGION) {
            config.region = region;
        }
        Ok(config)
    }
}

#[cfg(all(test, feature = "route53"))]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::DnsError;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_with_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.max_retries, 2);
        let ProviderCredentials::Route53 { session_token, .. } = &config.credentials;
        assert!(session_token.is_none());
    }

    #[test]
    fn env_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", "token"),
            ("NICE_DNS_ENDPOINT", "http://localhost:4566"),
            ("NICE_DNS_REGION", "eu-west-1"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "http://localhost:4566");
        assert_eq!(config.region, "eu-west-1");
        let ProviderCredentials::Route53 { session_token, .. } = &config.credentials;
        assert_eq!(session_token.as_deref(), Some("token"));
    }

    #[test]
    fn missing_secret_is_invalid_request() {
        let err = ClientConfig::from_lookup(lookup(&[("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")]))
            .unwrap_err();
        assert!(
            matches!(&err, DnsError::InvalidRequest { param, .. } if param == "AWS_SECRET_ACCESS_KEY"),
            "{err:?}"
        );
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"credentials":{"provider":"route53","credentials":{"accessKeyId":"A","secretAccessKey":"S"}}}"#,
        )
        .unwrap();
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
