//! Provider factory functions.

use std::sync::Arc;
#[cfg(feature = "route53")]
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::traits::DnsApi;
use crate::types::ProviderCredentials;

#[cfg(feature = "route53")]
use crate::providers::Route53Api;

/// Creates a [`DnsApi`] instance from a client configuration.
///
/// The concrete adapter is determined by the [`ProviderCredentials`] variant.
/// The result is wrapped in `Arc<dyn DnsApi>` so it can be shared with
/// background poll tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use nice_dns_provider::{ClientConfig, ProviderCredentials, create_api};
///
/// let api = create_api(ClientConfig::new(ProviderCredentials::Route53 {
///     access_key_id: "your-access-key-id".to_string(),
///     secret_access_key: "your-secret-access-key".to_string(),
///     session_token: None,
/// }))
/// .unwrap();
/// ```
pub fn create_api(config: ClientConfig) -> Result<Arc<dyn DnsApi>> {
    let ClientConfig {
        credentials,
        endpoint,
        region,
        max_retries,
        connect_timeout_secs,
        request_timeout_secs,
    } = config;

    match credentials {
        #[cfg(feature = "route53")]
        ProviderCredentials::Route53 {
            access_key_id,
            secret_access_key,
            session_token,
        } => {
            log::debug!(
                "Creating route53 client for {endpoint} ({region}), key {}",
                crate::utils::log_sanitizer::mask_key(&access_key_id)
            );
            let api = Route53Api::builder(access_key_id, secret_access_key)
                .session_token(session_token)
                .endpoint(endpoint)
                .region(region)
                .max_retries(max_retries)
                .connect_timeout(Duration::from_secs(connect_timeout_secs))
                .request_timeout(Duration::from_secs(request_timeout_secs))
                .build()?;
            Ok(Arc::new(api))
        }
    }
}
