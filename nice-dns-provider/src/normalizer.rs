//! Response normalizer
//!
//! Pure mapping functions from decoded provider documents to the record model.
//! Every function is total over the documented shapes and reports anything
//! else as [`DnsError::Parse`]; none of them panic on unexpected input.
//!
//! Two conventions are absorbed here:
//! - a list-typed field holding a single item may arrive as the bare item
//!   rather than a one-element array ([`one_or_many`]);
//! - names carry a trailing dot on the wire and none in the model.

use serde_json::{Map, Value};

use crate::dialect::{FieldPath, ListWrapping, ProviderDialect};
use crate::error::{DnsError, Result};
use crate::types::{AliasTarget, ChangeInfo, ChangeStatus, Page, Record, RecordCursor, Zone};
use crate::utils::datetime::parse_timestamp;
use crate::utils::domain::remove_trailing_dot;

// ============ Shape helpers ============

/// View a list-typed field as a sequence, wrapping a bare item.
///
/// `None` and `null` are empty.
pub fn one_or_many(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, key| node.get(key))
}

/// Items of the list at `path`. A missing list is empty.
fn list_at<'a>(doc: &'a Value, path: FieldPath, dialect: &ProviderDialect) -> Vec<&'a Value> {
    let Some((last, parents)) = path.split_last() else {
        return Vec::new();
    };
    let Some(parent) = lookup(doc, parents) else {
        return Vec::new();
    };
    // An empty wrapper element (`<HostedZones/>`) decodes as an empty string.
    if dialect.list_wrapping == ListWrapping::MemberElement && is_empty_text(parent) {
        return Vec::new();
    }
    one_or_many(parent.get(last))
        .into_iter()
        .filter(|v| !(dialect.list_wrapping == ListWrapping::MemberElement && is_empty_text(v)))
        .collect()
}

fn is_empty_text(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

fn parse_error(dialect: &ProviderDialect, detail: impl Into<String>) -> DnsError {
    DnsError::Parse {
        provider: dialect.name.to_string(),
        detail: detail.into(),
    }
}

fn as_object<'a>(
    value: &'a Value,
    what: &str,
    dialect: &ProviderDialect,
) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| parse_error(dialect, format!("{what} is not an object")))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn opt_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(text)
}

fn req_text(
    obj: &Map<String, Value>,
    key: &str,
    what: &str,
    dialect: &ProviderDialect,
) -> Result<String> {
    opt_text(obj, key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| parse_error(dialect, format!("{what} is missing {key}")))
}

fn opt_u32(
    obj: &Map<String, Value>,
    key: &str,
    what: &str,
    dialect: &ProviderDialect,
) -> Result<Option<u32>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| parse_error(dialect, format!("{what}.{key} is out of range: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| parse_error(dialect, format!("{what}.{key} is not a number: {e}"))),
        Some(other) => Err(parse_error(
            dialect,
            format!("{what}.{key} has unexpected shape: {other}"),
        )),
    }
}

/// Read a boolean that may be sent as a JSON bool or as `"true"`/`"false"`.
/// Absent means `false`.
fn flag(obj: &Map<String, Value>, key: &str, dialect: &ProviderDialect) -> Result<bool> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) => match s.trim() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(parse_error(dialect, format!("{key} is not a boolean: {other}"))),
        },
        Some(other) => Err(parse_error(dialect, format!("{key} is not a boolean: {other}"))),
    }
}

// ============ Identifiers ============

/// Strip the path prefix from a zone id (`/hostedzone/Z1` -> `Z1`).
pub fn extract_zone_id(raw: &str) -> Option<String> {
    let id = raw.rsplit('/').next().unwrap_or(raw);
    (!id.is_empty()).then(|| id.to_string())
}

/// Strip the `/change/` prefix from a change id.
pub fn extract_change_id(raw: &str) -> Option<String> {
    let id = raw.strip_prefix("/change/").unwrap_or(raw);
    (!id.is_empty() && !id.contains('/')).then(|| id.to_string())
}

// ============ Zones ============

fn zone_from_object(value: &Value, dialect: &ProviderDialect) -> Result<Zone> {
    let obj = as_object(value, "HostedZone", dialect)?;
    let raw_id = req_text(obj, "Id", "HostedZone", dialect)?;
    let zone_id = extract_zone_id(&raw_id)
        .ok_or_else(|| parse_error(dialect, format!("malformed zone id: {raw_id}")))?;
    let name = req_text(obj, "Name", "HostedZone", dialect)?;
    let comment = obj
        .get("Config")
        .and_then(Value::as_object)
        .and_then(|config| opt_text(config, "Comment"))
        .filter(|c| !c.is_empty());

    Ok(Zone {
        zone_id,
        name: remove_trailing_dot(&name).to_string(),
        reference: opt_text(obj, "CallerReference").unwrap_or_default(),
        comment,
        status: None,
        submitted_at: None,
        change_id: None,
        name_servers: None,
    })
}

/// Normalize one page of a list-zones response.
pub fn zones_page(doc: &Value, dialect: &ProviderDialect) -> Result<Page<Zone, String>> {
    let zones = list_at(doc, dialect.zones, dialect)
        .into_iter()
        .map(|z| zone_from_object(z, dialect))
        .collect::<Result<Vec<_>>>()?;

    let root = as_object(doc, "list zones response", dialect)?;
    if flag(root, dialect.is_truncated, dialect)? {
        let marker = req_text(root, dialect.next_marker, "truncated zone listing", dialect)?;
        Ok(Page::truncated(zones, marker))
    } else {
        Ok(Page::last(zones))
    }
}

/// Normalize a get-zone or create-zone response.
///
/// Change info and the delegation set are optional; when present they fill
/// `status`, `submitted_at`, `change_id` and `name_servers`.
pub fn zone(doc: &Value, dialect: &ProviderDialect) -> Result<Zone> {
    let hosted_zone = lookup(doc, dialect.zone)
        .ok_or_else(|| parse_error(dialect, "response has no HostedZone"))?;
    let mut zone = zone_from_object(hosted_zone, dialect)?;

    if lookup(doc, dialect.change_info).is_some() {
        let change = change_info(doc, dialect)?;
        zone.status = Some(change.status);
        zone.submitted_at = Some(change.submitted_at);
        zone.change_id = Some(change.change_id);
    }

    if lookup(doc, &dialect.name_servers[..1]).is_some() {
        let name_servers = list_at(doc, dialect.name_servers, dialect)
            .into_iter()
            .map(|ns| {
                text(ns).ok_or_else(|| parse_error(dialect, "name server is not a string"))
            })
            .collect::<Result<Vec<_>>>()?;
        zone.name_servers = Some(name_servers);
    }

    Ok(zone)
}

// ============ Records ============

fn alias_from_object(value: &Value, dialect: &ProviderDialect) -> Result<AliasTarget> {
    let obj = as_object(value, "AliasTarget", dialect)?;
    Ok(AliasTarget {
        hosted_zone_id: req_text(obj, "HostedZoneId", "AliasTarget", dialect)?,
        dns_name: req_text(obj, "DNSName", "AliasTarget", dialect)?,
        evaluate_target_health: flag(obj, "EvaluateTargetHealth", dialect)?,
    })
}

fn record_from_object(value: &Value, dialect: &ProviderDialect) -> Result<Record> {
    let obj = as_object(value, "ResourceRecordSet", dialect)?;
    let name = req_text(obj, "Name", "ResourceRecordSet", dialect)?;
    let record_type = req_text(obj, "Type", "ResourceRecordSet", dialect)?;

    // dialect.resource_records is relative to the record set
    let values = if lookup(value, &dialect.resource_records[..1]).is_some() {
        let values = list_at(value, dialect.resource_records, dialect)
            .into_iter()
            .map(|rr| {
                let rr = as_object(rr, "ResourceRecord", dialect)?;
                req_text(
                    rr,
                    ProviderDialect::RESOURCE_RECORD_VALUE,
                    "ResourceRecord",
                    dialect,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Some(values)
    } else {
        None
    };

    let alias = lookup(value, dialect.alias_target)
        .map(|a| alias_from_object(a, dialect))
        .transpose()?;

    Ok(Record {
        name: remove_trailing_dot(&name).to_string(),
        record_type,
        ttl: opt_u32(obj, "TTL", "ResourceRecordSet", dialect)?,
        set_identifier: opt_text(obj, "SetIdentifier"),
        weight: opt_u32(obj, "Weight", "ResourceRecordSet", dialect)?,
        values,
        alias,
    })
}

/// Normalize one page of a list-records response.
pub fn records_page(doc: &Value, dialect: &ProviderDialect) -> Result<Page<Record, RecordCursor>> {
    let records = list_at(doc, dialect.record_sets, dialect)
        .into_iter()
        .map(|r| record_from_object(r, dialect))
        .collect::<Result<Vec<_>>>()?;

    let root = as_object(doc, "list records response", dialect)?;
    if flag(root, dialect.is_truncated, dialect)? {
        let cursor = RecordCursor {
            name: req_text(root, dialect.next_record_name, "truncated record listing", dialect)?,
            record_type: req_text(
                root,
                dialect.next_record_type,
                "truncated record listing",
                dialect,
            )?,
            identifier: opt_text(root, dialect.next_record_identifier),
        };
        Ok(Page::truncated(records, cursor))
    } else {
        Ok(Page::last(records))
    }
}

// ============ Changes ============

/// Normalize the change info of a change, get-change or create-zone response.
pub fn change_info(doc: &Value, dialect: &ProviderDialect) -> Result<ChangeInfo> {
    let info = lookup(doc, dialect.change_info)
        .ok_or_else(|| parse_error(dialect, "response has no ChangeInfo"))?;
    let obj = as_object(info, "ChangeInfo", dialect)?;

    let url = req_text(obj, "Id", "ChangeInfo", dialect)?;
    let change_id = extract_change_id(&url)
        .ok_or_else(|| parse_error(dialect, format!("malformed change id: {url}")))?;
    let status = ChangeStatus::from(req_text(obj, "Status", "ChangeInfo", dialect)?);
    let raw_submitted = req_text(obj, "SubmittedAt", "ChangeInfo", dialect)?;
    let submitted_at = parse_timestamp(&raw_submitted).ok_or_else(|| {
        parse_error(dialect, format!("malformed SubmittedAt: {raw_submitted}"))
    })?;

    Ok(ChangeInfo {
        change_id,
        url,
        status,
        submitted_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dialect::{ROUTE53_JSON, ROUTE53_XML};

    fn zone_json(id: &str, name: &str) -> Value {
        json!({
            "Id": format!("/hostedzone/{id}"),
            "Name": format!("{name}."),
            "CallerReference": "ref-1",
            "Config": { "Comment": "managed", "PrivateZone": "false" },
            "ResourceRecordSetCount": "4"
        })
    }

    #[test]
    fn one_or_many_wraps_bare_items() {
        let bare = json!({"a": 1});
        let list = json!([{"a": 1}]);
        assert_eq!(one_or_many(Some(&bare)), one_or_many(Some(&list)));
        assert!(one_or_many(None).is_empty());
        assert!(one_or_many(Some(&Value::Null)).is_empty());
    }

    #[test]
    fn bare_zone_equals_one_element_list() {
        let bare = json!({
            "HostedZones": { "HostedZone": zone_json("Z1", "example.com") },
            "IsTruncated": "false",
            "MaxItems": "100"
        });
        let wrapped = json!({
            "HostedZones": { "HostedZone": [zone_json("Z1", "example.com")] },
            "IsTruncated": "false",
            "MaxItems": "100"
        });
        let a = zones_page(&bare, &ROUTE53_XML).unwrap();
        let b = zones_page(&wrapped, &ROUTE53_XML).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.items[0].zone_id, "Z1");
        assert_eq!(a.items[0].name, "example.com");
        assert_eq!(a.items[0].comment.as_deref(), Some("managed"));
    }

    #[test]
    fn bare_record_equals_one_element_list_in_json_dialect() {
        let rrset = json!({
            "Name": "www.example.com.",
            "Type": "A",
            "TTL": 300,
            "ResourceRecords": { "Value": "1.2.3.4" }
        });
        let bare = json!({ "ResourceRecordSets": rrset.clone(), "IsTruncated": false });
        let wrapped = json!({ "ResourceRecordSets": [rrset], "IsTruncated": false });
        let a = records_page(&bare, &ROUTE53_JSON).unwrap();
        let b = records_page(&wrapped, &ROUTE53_JSON).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.items[0].values, Some(vec!["1.2.3.4".to_string()]));
        assert_eq!(a.items[0].ttl, Some(300));
    }

    #[test]
    fn empty_member_list_is_empty() {
        let doc = json!({ "HostedZones": "", "IsTruncated": "false" });
        let page = zones_page(&doc, &ROUTE53_XML).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn truncated_zone_listing_carries_marker() {
        let doc = json!({
            "HostedZones": { "HostedZone": [zone_json("Z1", "a.com"), zone_json("Z2", "b.com")] },
            "IsTruncated": "true",
            "NextMarker": "Z3"
        });
        let page = zones_page(&doc, &ROUTE53_XML).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next.as_deref(), Some("Z3"));
    }

    #[test]
    fn truncated_without_marker_is_parse_error() {
        let doc = json!({ "HostedZones": "", "IsTruncated": true });
        let err = zones_page(&doc, &ROUTE53_XML).unwrap_err();
        assert!(matches!(err, DnsError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn missing_zone_id_is_parse_error() {
        let doc = json!({
            "HostedZones": { "HostedZone": { "Name": "example.com." } },
            "IsTruncated": "false"
        });
        assert!(matches!(
            zones_page(&doc, &ROUTE53_XML),
            Err(DnsError::Parse { .. })
        ));
    }

    #[test]
    fn zone_with_change_and_delegation_set() {
        let doc = json!({
            "HostedZone": zone_json("Z1PA6795UKMFR9", "example.com"),
            "ChangeInfo": {
                "Id": "/change/C1PA6795UKMFR9",
                "Status": "PENDING",
                "SubmittedAt": "2012-03-15T01:36:41.958Z"
            },
            "DelegationSet": {
                "NameServers": { "NameServer": ["ns-2048.awsdns-64.com", "ns-2049.awsdns-65.net"] }
            }
        });
        let zone = zone(&doc, &ROUTE53_XML).unwrap();
        assert_eq!(zone.zone_id, "Z1PA6795UKMFR9");
        assert_eq!(zone.change_id.as_deref(), Some("C1PA6795UKMFR9"));
        assert_eq!(zone.status, Some(ChangeStatus::Pending));
        assert_eq!(zone.name_servers.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn single_name_server_is_wrapped() {
        let doc = json!({
            "HostedZone": zone_json("Z1", "example.com"),
            "DelegationSet": { "NameServers": { "NameServer": "ns-1.awsdns-01.org" } }
        });
        let zone = zone(&doc, &ROUTE53_XML).unwrap();
        assert_eq!(zone.name_servers, Some(vec!["ns-1.awsdns-01.org".to_string()]));
    }

    #[test]
    fn records_keep_weights_identifiers_and_aliases() {
        let doc = json!({
            "ResourceRecordSets": { "ResourceRecordSet": [
                {
                    "Name": "\\052.example.com.",
                    "Type": "CNAME",
                    "SetIdentifier": "east",
                    "Weight": "10",
                    "TTL": "60",
                    "ResourceRecords": { "ResourceRecord": { "Value": "east.example.net" } }
                },
                {
                    "Name": "example.com.",
                    "Type": "A",
                    "AliasTarget": {
                        "HostedZoneId": "Z2FDTNDATAQYW2",
                        "DNSName": "d111111abcdef8.cloudfront.net.",
                        "EvaluateTargetHealth": "false"
                    }
                }
            ]},
            "IsTruncated": "true",
            "NextRecordName": "mail.example.com.",
            "NextRecordType": "MX",
            "NextRecordIdentifier": "west"
        });
        let page = records_page(&doc, &ROUTE53_XML).unwrap();
        let weighted = &page.items[0];
        assert_eq!(weighted.name, "\\052.example.com");
        assert_eq!(weighted.weight, Some(10));
        assert_eq!(weighted.set_identifier.as_deref(), Some("east"));

        let alias = &page.items[1];
        assert!(alias.is_alias());
        assert_eq!(alias.ttl, None);

        let next = page.next.unwrap();
        assert_eq!(next.name, "mail.example.com.");
        assert_eq!(next.record_type, "MX");
        assert_eq!(next.identifier.as_deref(), Some("west"));
    }

    #[test]
    fn non_numeric_ttl_is_parse_error() {
        let doc = json!({
            "ResourceRecordSets": [{ "Name": "a.", "Type": "A", "TTL": "soon" }],
            "IsTruncated": false
        });
        assert!(matches!(
            records_page(&doc, &ROUTE53_JSON),
            Err(DnsError::Parse { .. })
        ));
    }

    #[test]
    fn change_info_is_normalized() {
        let doc = json!({
            "ChangeInfo": {
                "Id": "/change/C2682N5HXP0BZ4",
                "Status": "PENDING",
                "SubmittedAt": "2012-10-09T06:12:42.058Z"
            }
        });
        let info = change_info(&doc, &ROUTE53_XML).unwrap();
        assert_eq!(info.change_id, "C2682N5HXP0BZ4");
        assert_eq!(info.url, "/change/C2682N5HXP0BZ4");
        assert_eq!(info.status, ChangeStatus::Pending);
    }

    #[test]
    fn change_info_with_bad_timestamp_is_parse_error() {
        let doc = json!({
            "ChangeInfo": { "Id": "/change/C1", "Status": "INSYNC", "SubmittedAt": "later" }
        });
        assert!(matches!(
            change_info(&doc, &ROUTE53_XML),
            Err(DnsError::Parse { .. })
        ));
    }

    #[test]
    fn identifiers_strip_prefixes() {
        assert_eq!(extract_zone_id("/hostedzone/Z1").as_deref(), Some("Z1"));
        assert_eq!(extract_zone_id("Z1").as_deref(), Some("Z1"));
        assert_eq!(extract_zone_id("/hostedzone/"), None);
        assert_eq!(extract_change_id("/change/C1").as_deref(), Some("C1"));
        assert_eq!(extract_change_id("/other/C1"), None);
    }
}
