use async_trait::async_trait;
use serde_json::Value;

use crate::dialect::ProviderDialect;
use crate::error::{ApiFault, DnsError, Result};
use crate::types::{ChangeBatch, CreateZoneRequest, RecordCursor};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Fault class (`Sender` / `Receiver`), if the provider sent one.
    pub error_type: Option<String>,
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
    /// HTTP status of the response.
    pub status: u16,
}

impl RawApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            error_type: None,
            code: None,
            message: message.into(),
            status,
        }
    }

    pub fn with_code(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: None,
            code: Some(code.into()),
            message: message.into(),
            status,
        }
    }

    #[must_use]
    pub fn with_type(mut self, error_type: Option<String>) -> Self {
        self.error_type = error_type;
        self
    }

    /// Convert into the verbatim fault carried by [`DnsError`].
    pub fn into_fault(self) -> ApiFault {
        let fault = ApiFault::new(self.code.unwrap_or_default(), self.message)
            .with_status(self.status);
        match self.error_type {
            Some(t) => fault.with_type(t),
            None => fault,
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Zone id the request addressed (used by `ZoneNotFound`).
    pub zone_id: Option<String>,
    /// Change id the request addressed (used by `ChangeNotFound`).
    pub change_id: Option<String>,
}

impl ErrorContext {
    pub fn zone(zone_id: &str) -> Self {
        Self {
            zone_id: Some(zone_id.to_string()),
            change_id: None,
        }
    }

    pub fn change(change_id: &str) -> Self {
        Self {
            zone_id: None,
            change_id: Some(change_id.to_string()),
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
/// 各 Provider 实现此 trait 以将原始 API 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> DnsError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> DnsError {
        DnsError::Parse {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> DnsError {
        DnsError::Provider {
            provider: self.provider_name().to_string(),
            fault: raw.into_fault(),
        }
    }
}

/// The administrative API of a DNS hosting provider.
///
/// Implementations handle transport, signing and wire decoding only. Every
/// method returns the decoded response document as-is; reshaping it into the
/// record model is done by [`crate::normalizer`] using [`Self::dialect`].
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// Document layout of this provider's responses.
    fn dialect(&self) -> &'static ProviderDialect;

    /// One page of hosted zones, resuming at `marker`.
    async fn list_zones(&self, marker: Option<&str>) -> Result<Value>;

    /// One hosted zone with its delegation set.
    async fn get_zone(&self, zone_id: &str) -> Result<Value>;

    async fn create_zone(&self, request: &CreateZoneRequest) -> Result<Value>;

    /// One page of record sets, resuming at `cursor`.
    async fn list_records(&self, zone_id: &str, cursor: Option<&RecordCursor>) -> Result<Value>;

    /// Submit a change batch. Names in `batch` are already in wire form.
    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<Value>;

    async fn get_change(&self, change_id: &str) -> Result<Value>;
}
