use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `type` reported in [`ErrorShape`] for failures detected locally by the client.
pub const CLIENT_ERROR_TYPE: &str = "NiceDns-Client";
/// `type` reported in [`ErrorShape`] for network-level failures.
pub const TRANSPORT_ERROR_TYPE: &str = "NiceDns-Transport";
/// `type` reported in [`ErrorShape`] for malformed or unexpected responses.
pub const NORMALIZER_ERROR_TYPE: &str = "NiceDns-Normalizer";

/// A fault reported by the provider API, preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFault {
    /// Fault class as sent by the provider (`Sender` / `Receiver` on Route 53).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Provider error code (e.g. `NoSuchHostedZone`).
    pub code: String,
    /// Provider error message.
    pub message: String,
    /// HTTP status of the response that carried the fault, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ApiFault {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: None,
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }
}

/// Coarse classification of a [`DnsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// The provider could not be reached.
    Transport,
    /// The provider rejected the request.
    Provider,
    /// A precondition failed locally; nothing was sent for the failing step.
    Client,
    /// A response did not have the documented shape.
    Normalization,
}

/// The uniform `{type, code, msg}` rendering of any [`DnsError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorShape {
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: String,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syscall: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
}

/// Unified error type for every client operation.
///
/// Provider faults keep the provider's own code and message in an [`ApiFault`];
/// the variant only adds a classification on top. Nothing in this crate retries
/// on any of these errors except the transport adapter, which retries idempotent
/// reads that failed with [`Transport`](Self::Transport),
/// [`Timeout`](Self::Timeout) or [`RateLimited`](Self::RateLimited).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DnsError {
    /// A network-level failure reaching the provider (DNS, connect, socket).
    #[error("[{provider}] Network error: {detail}")]
    Transport {
        provider: String,
        detail: String,
        /// Low-level operation that failed, when known (e.g. `connect`).
        syscall: Option<String>,
        /// OS error number, when known.
        errno: Option<i32>,
    },

    /// The HTTP request timed out.
    #[error("[{provider}] Request timeout: {detail}")]
    Timeout { provider: String, detail: String },

    /// The provider throttled the request.
    #[error("[{provider}] Rate limited: {}", .fault.message)]
    RateLimited {
        provider: String,
        /// Suggested wait in seconds, if the provider sent one.
        retry_after: Option<u64>,
        fault: ApiFault,
    },

    /// The signing credentials were rejected.
    #[error("[{provider}] Invalid credentials: {}", .fault.message)]
    InvalidCredentials { provider: String, fault: ApiFault },

    /// The credentials are valid but lack permission for the operation.
    #[error("[{provider}] Permission denied: {}", .fault.message)]
    PermissionDenied { provider: String, fault: ApiFault },

    /// The provider has no zone with the requested id.
    #[error("[{provider}] Hosted zone '{zone}' not found: {}", .fault.message)]
    ZoneNotFound {
        provider: String,
        zone: String,
        fault: ApiFault,
    },

    /// A zone with the same caller reference or name already exists.
    #[error("[{provider}] Hosted zone already exists: {}", .fault.message)]
    ZoneExists { provider: String, fault: ApiFault },

    /// The provider has no change with the requested id.
    #[error("[{provider}] Change '{change_id}' not found: {}", .fault.message)]
    ChangeNotFound {
        provider: String,
        change_id: String,
        fault: ApiFault,
    },

    /// The provider rejected the whole change batch.
    ///
    /// This is also how a concurrent external modification between listing and
    /// submission usually surfaces: the remove operation no longer describes
    /// the record as the provider holds it.
    #[error("[{provider}] Change batch rejected: {}", .fault.message)]
    InvalidChangeBatch { provider: String, fault: ApiFault },

    /// Any other provider fault.
    #[error("[{provider}] {}: {}", .fault.code, .fault.message)]
    Provider { provider: String, fault: ApiFault },

    /// No zone matched the requested domain name.
    #[error("Domain '{domain}' not found")]
    DomainNotFound { domain: String },

    /// No record matched the requested name/type (and set identifier).
    #[error("Record '{name}' ({record_type}) not found")]
    RecordNotFound {
        name: String,
        record_type: String,
        set_identifier: Option<String>,
    },

    /// More than one record matched a query that must match at most one.
    #[error("{count} records match '{name}' ({record_type})")]
    AmbiguousRecord {
        name: String,
        record_type: String,
        count: usize,
    },

    /// The request failed local validation.
    #[error("Invalid parameter '{param}': {detail}")]
    InvalidRequest { param: String, detail: String },

    /// A response was missing a required field or had an unexpected shape.
    #[error("[{provider}] Parse error: {detail}")]
    Parse { provider: String, detail: String },

    /// A request body could not be encoded.
    #[error("[{provider}] Serialization error: {detail}")]
    Serialization { provider: String, detail: String },
}

impl DnsError {
    pub(crate) fn invalid_request(param: &str, detail: impl Into<String>) -> Self {
        Self::InvalidRequest {
            param: param.to_string(),
            detail: detail.into(),
        }
    }

    /// Coarse classification, used by callers that only care who failed.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => ErrorCategory::Transport,
            Self::RateLimited { .. }
            | Self::InvalidCredentials { .. }
            | Self::PermissionDenied { .. }
            | Self::ZoneNotFound { .. }
            | Self::ZoneExists { .. }
            | Self::ChangeNotFound { .. }
            | Self::InvalidChangeBatch { .. }
            | Self::Provider { .. } => ErrorCategory::Provider,
            Self::DomainNotFound { .. }
            | Self::RecordNotFound { .. }
            | Self::AmbiguousRecord { .. }
            | Self::InvalidRequest { .. } => ErrorCategory::Client,
            Self::Parse { .. } | Self::Serialization { .. } => ErrorCategory::Normalization,
        }
    }

    /// The provider fault behind this error, if the provider produced it.
    pub fn fault(&self) -> Option<&ApiFault> {
        match self {
            Self::RateLimited { fault, .. }
            | Self::InvalidCredentials { fault, .. }
            | Self::PermissionDenied { fault, .. }
            | Self::ZoneNotFound { fault, .. }
            | Self::ZoneExists { fault, .. }
            | Self::ChangeNotFound { fault, .. }
            | Self::InvalidChangeBatch { fault, .. }
            | Self::Provider { fault, .. } => Some(fault),
            _ => None,
        }
    }

    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::ZoneNotFound { .. }
                | Self::ZoneExists { .. }
                | Self::ChangeNotFound { .. }
                | Self::InvalidChangeBatch { .. }
                | Self::DomainNotFound { .. }
                | Self::RecordNotFound { .. }
                | Self::InvalidRequest { .. }
        )
    }

    /// Render as the uniform `{type, code, msg}` shape.
    ///
    /// Provider faults report the provider's error code as `type` and the HTTP
    /// status as `code`; client-side failures report [`CLIENT_ERROR_TYPE`].
    pub fn shape(&self) -> ErrorShape {
        let plain = |error_type: &str, code: &str, msg: String| ErrorShape {
            error_type: error_type.to_string(),
            code: code.to_string(),
            msg,
            syscall: None,
            errno: None,
        };

        match self {
            Self::Transport {
                detail,
                syscall,
                errno,
                ..
            } => ErrorShape {
                error_type: TRANSPORT_ERROR_TYPE.to_string(),
                code: "NetworkError".to_string(),
                msg: detail.clone(),
                syscall: syscall.clone(),
                errno: *errno,
            },
            Self::Timeout { detail, .. } => plain(TRANSPORT_ERROR_TYPE, "Timeout", detail.clone()),
            Self::DomainNotFound { .. } => plain(
                CLIENT_ERROR_TYPE,
                "DomainNotFound",
                "The domain name/zoneId you specified was not found.".to_string(),
            ),
            Self::RecordNotFound { .. } => plain(
                CLIENT_ERROR_TYPE,
                "RecordNotFound",
                "The record you asked to delete could not be found.".to_string(),
            ),
            Self::AmbiguousRecord { .. } => plain(
                CLIENT_ERROR_TYPE,
                "AmbiguousRecord",
                "More than one record matched the requested name and type.".to_string(),
            ),
            Self::InvalidRequest { param, detail } => plain(
                CLIENT_ERROR_TYPE,
                "InvalidRequest",
                format!("{param}: {detail}"),
            ),
            Self::Parse { detail, .. } => {
                plain(NORMALIZER_ERROR_TYPE, "MalformedResponse", detail.clone())
            }
            Self::Serialization { detail, .. } => {
                plain(NORMALIZER_ERROR_TYPE, "SerializationError", detail.clone())
            }
            Self::RateLimited { fault, .. }
            | Self::InvalidCredentials { fault, .. }
            | Self::PermissionDenied { fault, .. }
            | Self::ZoneNotFound { fault, .. }
            | Self::ZoneExists { fault, .. }
            | Self::ChangeNotFound { fault, .. }
            | Self::InvalidChangeBatch { fault, .. }
            | Self::Provider { fault, .. } => ErrorShape {
                error_type: fault.code.clone(),
                code: fault.status.map(|s| s.to_string()).unwrap_or_default(),
                msg: fault.message.clone(),
                syscall: None,
                errno: None,
            },
        }
    }
}

/// Convenience type alias for `Result<T, DnsError>`.
pub type Result<T> = std::result::Result<T, DnsError>;
