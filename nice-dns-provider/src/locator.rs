//! Record locator and diff engine
//!
//! Decides which change entries a logical mutation turns into, given the
//! records currently in the zone. Remove entries always carry the existing
//! record verbatim: the provider only accepts a delete that describes the
//! record exactly as it holds it.

use serde::{Deserialize, Serialize};

use crate::error::{DnsError, Result};
use crate::types::{Record, RecordChange};
use crate::utils::domain::names_match;

/// Match predicate over a zone's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    /// When `None`, records are matched on name and type alone, including
    /// records that carry a set identifier of their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
}

impl RecordQuery {
    pub fn new(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            set_identifier: None,
        }
    }

    #[must_use]
    pub fn with_set_identifier(mut self, set_identifier: Option<String>) -> Self {
        self.set_identifier = set_identifier;
        self
    }

    /// Names are compared after escape decoding and trailing-dot removal,
    /// ignoring ASCII case. Types are compared ignoring ASCII case.
    pub fn matches(&self, record: &Record) -> bool {
        names_match(&record.name, &self.name)
            && record.record_type.eq_ignore_ascii_case(&self.record_type)
            && self
                .set_identifier
                .as_deref()
                .is_none_or(|id| record.set_identifier.as_deref() == Some(id))
    }
}

/// Every record satisfying `query`, in listing order.
pub fn find_all_matching<'a>(records: &'a [Record], query: &RecordQuery) -> Vec<&'a Record> {
    records.iter().filter(|r| query.matches(r)).collect()
}

/// The unique record satisfying `query`, if any.
///
/// Two or more matches are reported as [`DnsError::AmbiguousRecord`] rather
/// than resolved by picking one.
pub fn find_matching(records: &[Record], query: &RecordQuery) -> Result<Option<Record>> {
    match find_all_matching(records, query).as_slice() {
        [] => Ok(None),
        [record] => Ok(Some((*record).clone())),
        many => Err(DnsError::AmbiguousRecord {
            name: query.name.clone(),
            record_type: query.record_type.clone(),
            count: many.len(),
        }),
    }
}

/// How a write treats a record that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Remove the existing record, then create the desired one, in one batch.
    Set,
    /// A single replace entry; the provider does the matching.
    Upsert,
}

/// Change entries that make the zone contain `desired`.
pub fn plan_mutation(
    mode: WriteMode,
    existing: Option<&Record>,
    desired: Record,
) -> Vec<RecordChange> {
    match (mode, existing) {
        (WriteMode::Upsert, _) => vec![RecordChange::upsert(desired)],
        (WriteMode::Set, Some(existing)) => vec![
            RecordChange::delete(existing.clone()),
            RecordChange::create(desired),
        ],
        (WriteMode::Set, None) => vec![RecordChange::create(desired)],
    }
}

/// One remove entry per matched record.
///
/// Fails with [`DnsError::RecordNotFound`] when nothing matched, so that no
/// write is issued.
pub fn plan_delete(matches: Vec<Record>, query: &RecordQuery) -> Result<Vec<RecordChange>> {
    if matches.is_empty() {
        return Err(DnsError::RecordNotFound {
            name: query.name.clone(),
            record_type: query.record_type.clone(),
            set_identifier: query.set_identifier.clone(),
        });
    }
    Ok(matches.into_iter().map(RecordChange::delete).collect())
}
