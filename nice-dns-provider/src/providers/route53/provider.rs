//! Route 53 `DnsApi` implementation

use async_trait::async_trait;
use serde_json::Value;

use crate::dialect::{ProviderDialect, ROUTE53_XML};
use crate::error::Result;
use crate::traits::{DnsApi, ErrorContext};
use crate::types::{ChangeBatch, CreateZoneRequest, RecordCursor};

use super::{ROUTE53_SERVICE, Route53Api, xml};

impl Route53Api {
    fn path(&self, tail: &str) -> String {
        format!("/{}{tail}", self.dialect().api_version)
    }
}

#[async_trait]
impl DnsApi for Route53Api {
    fn id(&self) -> &'static str {
        ROUTE53_SERVICE
    }

    fn dialect(&self) -> &'static ProviderDialect {
        &ROUTE53_XML
    }

    async fn list_zones(&self, marker: Option<&str>) -> Result<Value> {
        let params: Vec<(&str, &str)> = marker.map(|m| ("marker", m)).into_iter().collect();
        self.get(&self.path("/hostedzone"), &params, ErrorContext::default())
            .await
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Value> {
        self.get(
            &self.path(&format!("/hostedzone/{zone_id}")),
            &[],
            ErrorContext::zone(zone_id),
        )
        .await
    }

    async fn create_zone(&self, request: &CreateZoneRequest) -> Result<Value> {
        let body = xml::create_hosted_zone(self.dialect().xml_namespace, request);
        self.post(&self.path("/hostedzone"), &body, ErrorContext::default())
            .await
    }

    async fn list_records(&self, zone_id: &str, cursor: Option<&RecordCursor>) -> Result<Value> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(cursor) = cursor {
            params.push(("name", cursor.name.as_str()));
            params.push(("type", cursor.record_type.as_str()));
            if let Some(identifier) = &cursor.identifier {
                params.push(("identifier", identifier.as_str()));
            }
        }
        self.get(
            &self.path(&format!("/hostedzone/{zone_id}/rrset")),
            &params,
            ErrorContext::zone(zone_id),
        )
        .await
    }

    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<Value> {
        let body = xml::change_resource_record_sets(self.dialect().xml_namespace, batch);
        self.post(
            &self.path(&format!("/hostedzone/{zone_id}/rrset/")),
            &body,
            ErrorContext::zone(zone_id),
        )
        .await
    }

    async fn get_change(&self, change_id: &str) -> Result<Value> {
        self.get(
            &self.path(&format!("/change/{change_id}")),
            &[],
            ErrorContext::change(change_id),
        )
        .await
    }
}
