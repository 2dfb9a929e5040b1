use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Pagination ============

/// One page of a cursor-paginated listing, already normalized.
///
/// `next` is `Some` only when the provider reported the listing as truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T, C> {
    /// Items on this page, in provider order.
    pub items: Vec<T>,
    /// Cursor to resume from, if more pages follow.
    pub next: Option<C>,
}

impl<T, C> Page<T, C> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    pub fn truncated(items: Vec<T>, next: C) -> Self {
        Self {
            items,
            next: Some(next),
        }
    }
}

/// Continuation key for record listings.
///
/// Record order is (name, type, set identifier), so a name alone cannot
/// resume a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCursor {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

// ============ Zone ============

/// A hosted zone.
///
/// Identity is `zone_id`. Values are snapshots: fetch again to observe changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Provider zone id, without any path prefix (e.g. `"Z1PA6795UKMFR9"`).
    pub zone_id: String,
    /// Zone apex without the trailing dot.
    pub name: String,
    /// Caller reference the zone was created with.
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Status of the creation change, when the response carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ChangeStatus>,
    #[serde(with = "crate::utils::datetime")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_servers: Option<Vec<String>>,
}

/// Request to create a hosted zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateZoneRequest {
    /// Zone apex, with or without trailing dot.
    pub name: String,
    /// Idempotency reference; defaults to `name`.
    pub reference: Option<String>,
    pub comment: Option<String>,
}

impl CreateZoneRequest {
    /// Caller reference sent to the provider.
    pub fn caller_reference(&self) -> &str {
        self.reference.as_deref().unwrap_or(&self.name)
    }
}

// ============ Records ============

/// Target of an alias record: another resource managed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    #[serde(default)]
    pub evaluate_target_health: bool,
}

/// A record set within a zone.
///
/// The natural key is `(name, record_type)`, refined by `set_identifier` for
/// weighted or otherwise partitioned sets. A record without `values` is an
/// alias record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Owner name without the trailing dot (as listed) or with it (on the wire).
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<AliasTarget>,
}

impl Record {
    pub fn is_alias(&self) -> bool {
        self.values.is_none() && self.alias.is_some()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.record_type)?;
        if let Some(id) = &self.set_identifier {
            write!(f, "[{id}]")?;
        }
        match (&self.values, &self.alias) {
            (Some(values), _) => write!(f, "/{}", values.join(",")),
            (None, Some(alias)) => write!(f, "/ALIAS {}", alias.dns_name),
            (None, None) => Ok(()),
        }
    }
}

/// Request for `set_record` / `upsert_record`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecordRequest {
    /// Zone id, or a zone domain name.
    pub zone_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    /// TTL in seconds; not sent for alias records.
    pub ttl: u32,
    pub values: Option<Vec<String>>,
    pub alias: Option<AliasTarget>,
    pub set_identifier: Option<String>,
    pub weight: Option<u32>,
    /// Comment attached to the change batch.
    pub comment: Option<String>,
}

impl SetRecordRequest {
    /// The record this request asks the zone to contain.
    pub fn desired_record(&self) -> Record {
        let alias = if self.values.is_some() {
            None
        } else {
            self.alias.clone()
        };
        Record {
            name: self.name.clone(),
            record_type: self.record_type.clone(),
            ttl: if alias.is_some() { None } else { Some(self.ttl) },
            set_identifier: self.set_identifier.clone(),
            weight: self.weight,
            values: self.values.clone(),
            alias,
        }
    }
}

/// Request for `del_record`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelRecordRequest {
    /// Zone id, or a zone domain name.
    pub zone_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub set_identifier: Option<String>,
}

// ============ Changes ============

/// Propagation status of a submitted change.
///
/// Anything other than `PENDING` / `INSYNC` is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeStatus {
    Pending,
    InSync,
    Other(String),
}

impl ChangeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::InSync => "INSYNC",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ChangeStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PENDING" => Self::Pending,
            "INSYNC" => Self::InSync,
            _ => Self::Other(s),
        }
    }
}

impl From<ChangeStatus> for String {
    fn from(s: ChangeStatus) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one submitted change batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInfo {
    /// Change id without path prefix.
    pub change_id: String,
    /// The provider's full change reference (e.g. `/change/C2682N5HXP0BZ4`).
    pub url: String,
    pub status: ChangeStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Action of one entry in a change batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Create,
    Delete,
    Upsert,
}

impl ChangeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
            Self::Upsert => "UPSERT",
        }
    }
}

/// One entry in a change batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub record: Record,
}

impl RecordChange {
    pub fn create(record: Record) -> Self {
        Self {
            action: ChangeAction::Create,
            record,
        }
    }

    pub fn delete(record: Record) -> Self {
        Self {
            action: ChangeAction::Delete,
            record,
        }
    }

    pub fn upsert(record: Record) -> Self {
        Self {
            action: ChangeAction::Upsert,
            record,
        }
    }
}

impl fmt::Display for RecordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action.as_str(), self.record)
    }
}

/// An all-or-nothing set of changes against one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub changes: Vec<RecordChange>,
}

// ============ Credentials ============

/// Credentials for a provider adapter.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// AWS Route 53. Requires feature `route53`.
    #[cfg(feature = "route53")]
    #[serde(rename = "route53", rename_all = "camelCase")]
    Route53 {
        access_key_id: String,
        secret_access_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_token: Option<String>,
    },
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "route53")]
            Self::Route53 { access_key_id, .. } => f
                .debug_struct("Route53")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"***")
                .finish_non_exhaustive(),
        }
    }
}
