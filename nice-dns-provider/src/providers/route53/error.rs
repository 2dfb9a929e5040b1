//! Route 53 错误映射
//!
//! 参考: <https://docs.aws.amazon.com/Route53/latest/APIReference/CommonErrors.html>
//!
//! ## 错误码分类
//!
//! - **认证错误**：InvalidClientTokenId, SignatureDoesNotMatch, IncompleteSignature,
//!   MissingAuthenticationToken, ExpiredToken, UnrecognizedClientException
//! - **权限拒绝**：AccessDenied, AccessDeniedException
//! - **频率限制**：Throttling, ThrottlingException, PriorRequestNotComplete
//! - **Zone**：NoSuchHostedZone (`ZoneNotFound`), HostedZoneAlreadyExists,
//!   ConflictingDomainExists (`ZoneExists`)
//! - **Change**：NoSuchChange (`ChangeNotFound`), InvalidChangeBatch
//!
//! Everything else (InvalidInput, InvalidDomainName, TooManyHostedZones, ...)
//! falls back to [`DnsError::Provider`] with the fault kept verbatim.

use crate::error::DnsError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{ROUTE53_SERVICE, Route53Api};

impl ProviderErrorMapper for Route53Api {
    fn provider_name(&self) -> &'static str {
        ROUTE53_SERVICE
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> DnsError {
        let provider = self.provider_name().to_string();
        match raw.code.as_deref() {
            // ============ 认证错误 ============
            Some(
                "InvalidClientTokenId"
                | "SignatureDoesNotMatch"
                | "IncompleteSignature"
                | "MissingAuthenticationToken"
                | "ExpiredToken"
                | "UnrecognizedClientException",
            ) => DnsError::InvalidCredentials {
                provider,
                fault: raw.into_fault(),
            },

            // ============ 权限拒绝 ============
            Some("AccessDenied" | "AccessDeniedException") => DnsError::PermissionDenied {
                provider,
                fault: raw.into_fault(),
            },

            // ============ 频率限制 ============
            Some("Throttling" | "ThrottlingException" | "PriorRequestNotComplete") => {
                DnsError::RateLimited {
                    provider,
                    retry_after: None,
                    fault: raw.into_fault(),
                }
            }

            // ============ Zone ============
            Some("NoSuchHostedZone") => DnsError::ZoneNotFound {
                provider,
                zone: context.zone_id.unwrap_or_default(),
                fault: raw.into_fault(),
            },
            Some("HostedZoneAlreadyExists" | "ConflictingDomainExists") => DnsError::ZoneExists {
                provider,
                fault: raw.into_fault(),
            },

            // ============ Change ============
            Some("NoSuchChange") => DnsError::ChangeNotFound {
                provider,
                change_id: context.change_id.unwrap_or_default(),
                fault: raw.into_fault(),
            },
            Some("InvalidChangeBatch") => DnsError::InvalidChangeBatch {
                provider,
                fault: raw.into_fault(),
            },

            // ============ 未知错误 ============
            _ => self.unknown_error(raw),
        }
    }
}
