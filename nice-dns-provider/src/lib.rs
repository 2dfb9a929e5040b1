//! # nice-dns-provider
//!
//! A convenience client for cloud DNS hosting APIs. It wraps the raw provider
//! API with the operations people actually want: look a zone up by name, set a
//! record without caring whether it exists, delete by name and type, and wait
//! for a change to propagate.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method |
//! |----------|-------------|-------------|
//! | [Amazon Route 53](https://aws.amazon.com/route53/) | `route53` | AWS Signature V4 |
//!
//! ## Feature Flags
//!
//! - **`route53`** *(default)*: Enable the Route 53 REST/XML adapter.
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use nice_dns_provider::{ClientConfig, DnsClient, SetRecordRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Credentials from AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY
//!     let client = DnsClient::from_config(ClientConfig::from_env()?)?;
//!
//!     // 2. Zones can be addressed by id or by name
//!     let zone = client.resolve_zone("example.com").await?;
//!     println!("{} ({})", zone.name, zone.zone_id);
//!
//!     // 3. Replace www.example.com/A, then wait for it to propagate
//!     let request = SetRecordRequest {
//!         zone_id: zone.zone_id.clone(),
//!         name: "www.example.com".to_string(),
//!         record_type: "A".to_string(),
//!         ttl: 300,
//!         values: Some(vec!["192.0.2.10".to_string()]),
//!         ..Default::default()
//!     };
//!     let tracked = client
//!         .set_record(&request, Some(Duration::from_secs(5)))
//!         .await?;
//!     if let Some(watch) = tracked.watch {
//!         println!("{:?}", watch.wait().await);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, DnsError>`](DnsError). Every error can
//! be rendered as an [`ErrorShape`] (`type`, `code`, `msg`) for display, and
//! is classified by [`ErrorCategory`]:
//!
//! - transport failures ([`DnsError::Transport`], [`DnsError::Timeout`])
//! - provider rejections, with the provider's fault kept verbatim
//! - client-side outcomes ([`DnsError::DomainNotFound`], [`DnsError::RecordNotFound`])
//! - responses that could not be normalized ([`DnsError::Parse`])
//!
//! Idempotent reads are retried on transport errors and throttling with
//! exponential backoff. Change submissions are never retried.

mod client;
mod config;
mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub mod dialect;
pub mod locator;
pub mod normalizer;
pub mod pagination;
pub mod poller;

// Re-export the client
pub use client::{DnsClient, Tracked};

// Re-export configuration
pub use config::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_REGION};

// Re-export error types
pub use error::{ApiFault, DnsError, ErrorCategory, ErrorShape, Result};

// Re-export factory functions
pub use factory::create_api;

// Re-export the provider seam
pub use traits::DnsApi;

// Re-export types
pub use types::{
    AliasTarget, ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, CreateZoneRequest,
    DelRecordRequest, Page, ProviderCredentials, Record, RecordChange, RecordCursor,
    SetRecordRequest, Zone,
};

pub use dialect::{ProviderDialect, ROUTE53_JSON, ROUTE53_XML};
pub use locator::{RecordQuery, WriteMode};
pub use poller::{ChangeWatch, PollEvent, PollFailure, PollOutcome, PollState};

// Re-export utils modules
pub use utils::{datetime, domain};

// Re-export concrete providers (behind feature flags)
#[cfg(feature = "route53")]
pub use providers::{Route53Api, Route53ApiBuilder};
