//! Public client
//!
//! [`DnsClient`] composes the pieces: zone resolution, paginated listings, the
//! record diff, change submission and propagation polling. It holds no state
//! besides the provider handle, so every call sees the provider as it is at
//! that moment.
//!
//! Mutations that diff against the current records (`set_record`,
//! `del_record`) are best-effort: the provider has no way to lock a zone
//! between the listing and the submission. If another writer changes the
//! record in between, the remove entry no longer describes the record exactly
//! and the provider rejects the whole batch with
//! [`DnsError::InvalidChangeBatch`]. Nothing is written in that case and
//! nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::dialect::ProviderDialect;
use crate::error::{DnsError, Result};
use crate::factory::create_api;
use crate::locator::{self, RecordQuery, WriteMode};
use crate::normalizer;
use crate::pagination::walk_pages;
use crate::poller::ChangeWatch;
use crate::traits::DnsApi;
use crate::types::{
    ChangeBatch, ChangeInfo, CreateZoneRequest, DelRecordRequest, Record, RecordChange,
    RecordCursor, SetRecordRequest, Zone,
};
use crate::utils::domain::{add_trailing_dot, looks_like_domain, names_match};

/// Result of a mutation, with an optional watch on its propagation.
#[derive(Debug)]
pub struct Tracked<T> {
    pub value: T,
    /// Present when the caller asked for polling.
    pub watch: Option<ChangeWatch>,
}

impl<T> Tracked<T> {
    pub fn into_parts(self) -> (T, Option<ChangeWatch>) {
        (self.value, self.watch)
    }
}

/// Convenience client over one provider API.
#[derive(Clone)]
pub struct DnsClient {
    api: Arc<dyn DnsApi>,
}

impl DnsClient {
    pub fn new(api: Arc<dyn DnsApi>) -> Self {
        Self { api }
    }

    /// Build the provider adapter described by `config` and wrap it.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::new(create_api(config)?))
    }

    pub fn api(&self) -> &Arc<dyn DnsApi> {
        &self.api
    }

    fn dialect(&self) -> &'static ProviderDialect {
        self.api.dialect()
    }

    // ==================== Zones ====================

    /// Every hosted zone in the account.
    pub async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.list_zones_from(None).await
    }

    /// Every hosted zone from `marker` onwards.
    pub async fn list_zones_from(&self, marker: Option<&str>) -> Result<Vec<Zone>> {
        let dialect = self.dialect();
        walk_pages(marker.map(str::to_string), |marker: Option<String>| {
            let api = Arc::clone(&self.api);
            async move {
                let doc = api.list_zones(marker.as_deref()).await?;
                normalizer::zones_page(&doc, dialect)
            }
        })
        .await
    }

    /// Look a zone up by id, or by domain name when the input contains a dot.
    ///
    /// A name is resolved to an id through the zone listing and then fetched
    /// by id, so both forms return the same value.
    pub async fn resolve_zone(&self, id_or_name: &str) -> Result<Zone> {
        let zone_id = self.zone_id_for(id_or_name).await?;
        self.zone_by_id(&zone_id).await
    }

    async fn zone_by_id(&self, zone_id: &str) -> Result<Zone> {
        let doc = self.api.get_zone(zone_id).await?;
        normalizer::zone(&doc, self.dialect())
    }

    /// Zone id for an id or a domain name. Names cost one full zone listing.
    async fn zone_id_for(&self, id_or_name: &str) -> Result<String> {
        let input = require("zoneId", id_or_name)?;
        if !looks_like_domain(input) {
            return normalizer::extract_zone_id(input)
                .ok_or_else(|| DnsError::invalid_request("zoneId", "malformed zone id"));
        }

        let zones = self.list_zones().await?;
        zones
            .into_iter()
            .find(|z| names_match(&z.name, input))
            .map(|z| z.zone_id)
            .ok_or_else(|| {
                log::warn!("No hosted zone named {input}");
                DnsError::DomainNotFound {
                    domain: input.to_string(),
                }
            })
    }

    /// Create a hosted zone.
    ///
    /// The caller reference defaults to the zone name. With `poll`, the
    /// returned watch tracks the creation change.
    pub async fn create_zone(
        &self,
        request: &CreateZoneRequest,
        poll: Option<Duration>,
    ) -> Result<Tracked<Zone>> {
        let name = require("name", &request.name)?;
        validate_poll(poll)?;

        let wire = CreateZoneRequest {
            name: add_trailing_dot(name),
            reference: Some(request.caller_reference().to_string()),
            comment: request.comment.clone(),
        };
        let doc = self.api.create_zone(&wire).await?;
        let zone = normalizer::zone(&doc, self.dialect())?;
        log::debug!("Created zone {} ({})", zone.name, zone.zone_id);

        let watch = self.watch(zone.change_id.as_deref(), poll)?;
        Ok(Tracked { value: zone, watch })
    }

    // ==================== Records ====================

    /// Every record set of a zone, given by id or domain name.
    pub async fn list_records(&self, zone: &str) -> Result<Vec<Record>> {
        let zone_id = self.zone_id_for(zone).await?;
        self.records_of(&zone_id).await
    }

    async fn records_of(&self, zone_id: &str) -> Result<Vec<Record>> {
        let dialect = self.dialect();
        walk_pages(None, |cursor: Option<RecordCursor>| {
            let api = Arc::clone(&self.api);
            let zone_id = zone_id.to_string();
            async move {
                let doc = api.list_records(&zone_id, cursor.as_ref()).await?;
                normalizer::records_page(&doc, dialect)
            }
        })
        .await
    }

    /// The unique record of `zone` matching `query`, if any.
    pub async fn find_matching(&self, zone: &str, query: &RecordQuery) -> Result<Option<Record>> {
        let records = self.list_records(zone).await?;
        locator::find_matching(&records, query)
    }

    /// Make the zone contain exactly the requested record.
    ///
    /// A matching existing record is removed and the new one created in the
    /// same batch. Without a set identifier the match is on name and type
    /// only, and more than one match is refused as ambiguous.
    pub async fn set_record(
        &self,
        request: &SetRecordRequest,
        poll: Option<Duration>,
    ) -> Result<Tracked<ChangeInfo>> {
        validate_write(request)?;
        validate_poll(poll)?;

        let zone_id = self.zone_id_for(&request.zone_id).await?;
        let records = self.records_of(&zone_id).await?;
        let query = RecordQuery::new(&request.name, &request.record_type)
            .with_set_identifier(request.set_identifier.clone());
        let existing = locator::find_matching(&records, &query)?;

        let changes = locator::plan_mutation(
            WriteMode::Set,
            existing.as_ref(),
            request.desired_record(),
        );
        let change = self
            .submit(&zone_id, changes, request.comment.clone())
            .await?;
        self.tracked(change, poll)
    }

    /// Create or replace a record in one step, without listing the zone.
    pub async fn upsert_record(
        &self,
        request: &SetRecordRequest,
        poll: Option<Duration>,
    ) -> Result<Tracked<ChangeInfo>> {
        validate_write(request)?;
        validate_poll(poll)?;

        let zone_id = self.zone_id_for(&request.zone_id).await?;
        let changes = locator::plan_mutation(WriteMode::Upsert, None, request.desired_record());
        let change = self
            .submit(&zone_id, changes, request.comment.clone())
            .await?;
        self.tracked(change, poll)
    }

    /// Remove every record matching the request.
    ///
    /// Fails with [`DnsError::RecordNotFound`] before anything is written when
    /// nothing matches.
    pub async fn del_record(
        &self,
        request: &DelRecordRequest,
        poll: Option<Duration>,
    ) -> Result<Tracked<ChangeInfo>> {
        require("name", &request.name)?;
        require("type", &request.record_type)?;
        validate_poll(poll)?;

        let zone_id = self.zone_id_for(&request.zone_id).await?;
        let records = self.records_of(&zone_id).await?;
        let query = RecordQuery::new(&request.name, &request.record_type)
            .with_set_identifier(request.set_identifier.clone());
        let matches = locator::find_all_matching(&records, &query)
            .into_iter()
            .cloned()
            .collect();

        let changes = locator::plan_delete(matches, &query)?;
        let change = self.submit(&zone_id, changes, None).await?;
        self.tracked(change, poll)
    }

    /// Send `changes` as one all-or-nothing batch.
    ///
    /// Record names are converted to their trailing-dot wire form. Exactly one
    /// request is made; it is never retried.
    pub async fn submit(
        &self,
        zone_id: &str,
        changes: Vec<RecordChange>,
        comment: Option<String>,
    ) -> Result<ChangeInfo> {
        if changes.is_empty() {
            return Err(DnsError::invalid_request(
                "changes",
                "a change batch needs at least one entry",
            ));
        }

        let batch = ChangeBatch {
            comment,
            changes: changes
                .into_iter()
                .map(|mut change| {
                    change.record.name = add_trailing_dot(&change.record.name);
                    change
                })
                .collect(),
        };

        log::debug!(
            "[{}] Submitting {} change(s) to {zone_id}",
            self.api.id(),
            batch.changes.len()
        );
        for change in &batch.changes {
            log::debug!("  {change}");
        }

        let doc = self.api.change_record_sets(zone_id, &batch).await?;
        normalizer::change_info(&doc, self.dialect())
    }

    // ==================== Changes ====================

    /// Current status of a change (`/change/` prefix optional).
    pub async fn get_change_status(&self, change_id: &str) -> Result<ChangeInfo> {
        let id = normalizer::extract_change_id(require("changeId", change_id)?)
            .ok_or_else(|| DnsError::invalid_request("changeId", "malformed change id"))?;
        let doc = self.api.get_change(&id).await?;
        normalizer::change_info(&doc, self.dialect())
    }

    /// Poll a change every `every` until it is in sync, fails, or the returned
    /// watch is cancelled or dropped.
    ///
    /// A zero interval or an empty change id is rejected before anything is
    /// spawned. Must be called from within a tokio runtime.
    pub fn poll_change_until_in_sync(
        &self,
        change_id: &str,
        every: Duration,
    ) -> Result<ChangeWatch> {
        validate_poll(Some(every))?;
        let change_id = require("changeId", change_id)?;
        let id = normalizer::extract_change_id(change_id).unwrap_or_else(|| change_id.to_string());
        let api = Arc::clone(&self.api);
        let fetch_id = id.clone();
        Ok(ChangeWatch::spawn(id, every, move || {
            let api = Arc::clone(&api);
            let change_id = fetch_id.clone();
            async move {
                let doc = api.get_change(&change_id).await?;
                normalizer::change_info(&doc, api.dialect())
            }
        }))
    }

    fn watch(
        &self,
        change_id: Option<&str>,
        poll: Option<Duration>,
    ) -> Result<Option<ChangeWatch>> {
        match (change_id, poll) {
            (Some(id), Some(every)) => self.poll_change_until_in_sync(id, every).map(Some),
            _ => Ok(None),
        }
    }

    fn tracked(&self, change: ChangeInfo, poll: Option<Duration>) -> Result<Tracked<ChangeInfo>> {
        let watch = self.watch(Some(&change.change_id), poll)?;
        Ok(Tracked {
            value: change,
            watch,
        })
    }
}

// ==================== Validation ====================

fn require<'a>(param: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DnsError::invalid_request(param, "must not be empty"))
    } else {
        Ok(trimmed)
    }
}

fn validate_poll(poll: Option<Duration>) -> Result<()> {
    match poll {
        Some(every) if every.is_zero() => Err(DnsError::invalid_request(
            "pollInterval",
            "must be greater than zero",
        )),
        _ => Ok(()),
    }
}

fn validate_write(request: &SetRecordRequest) -> Result<()> {
    require("name", &request.name)?;
    require("type", &request.record_type)?;
    match (&request.values, &request.alias) {
        (Some(_), Some(_)) => Err(DnsError::invalid_request(
            "values",
            "values and alias are mutually exclusive",
        )),
        (Some(values), None) if values.is_empty() || values.iter().any(|v| v.trim().is_empty()) => {
            Err(DnsError::invalid_request(
                "values",
                "must be a non-empty list of non-empty values",
            ))
        }
        (None, None) => Err(DnsError::invalid_request(
            "values",
            "either values or alias is required",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AliasTarget;

    fn request() -> SetRecordRequest {
        SetRecordRequest {
            zone_id: "Z1".to_string(),
            name: "www.example.com".to_string(),
            record_type: "A".to_string(),
            ttl: 300,
            values: Some(vec!["1.2.3.4".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn write_validation() {
        assert!(validate_write(&request()).is_ok());

        let empty_values = SetRecordRequest {
            values: Some(Vec::new()),
            ..request()
        };
        assert!(validate_write(&empty_values).is_err());

        let neither = SetRecordRequest {
            values: None,
            ..request()
        };
        assert!(validate_write(&neither).is_err());

        let both = SetRecordRequest {
            alias: Some(AliasTarget {
                hosted_zone_id: "Z2".to_string(),
                dns_name: "lb.example.net".to_string(),
                evaluate_target_health: true,
            }),
            ..request()
        };
        assert!(validate_write(&both).is_err());

        let blank_name = SetRecordRequest {
            name: "  ".to_string(),
            ..request()
        };
        assert!(matches!(
            validate_write(&blank_name),
            Err(DnsError::InvalidRequest { ref param, .. }) if param == "name"
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        assert!(validate_poll(Some(Duration::ZERO)).is_err());
        assert!(validate_poll(Some(Duration::from_secs(1))).is_ok());
        assert!(validate_poll(None).is_ok());
    }
}
