//! Provider dialects
//!
//! Different generations of the provider API return the same logical documents
//! with different nesting. A [`ProviderDialect`] names where each piece lives so
//! that a single normalizer serves all of them.

/// Path of object keys from the response root to a field.
pub type FieldPath = &'static [&'static str];

/// How list-typed fields are laid out in a response document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListWrapping {
    /// Items sit under a member element inside the list element
    /// (`<HostedZones><HostedZone/>...</HostedZones>`). A single member
    /// decodes as a bare object.
    MemberElement,
    /// The list field holds the items directly, but a singleton may still be
    /// sent as a bare object instead of a one-element array.
    Bare,
}

/// Capability descriptor for one provider API generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDialect {
    /// Short identifier used in logs and errors.
    pub name: &'static str,
    /// API version segment used in request paths.
    pub api_version: &'static str,
    /// XML namespace of request documents.
    pub xml_namespace: &'static str,
    pub list_wrapping: ListWrapping,

    /// Zone list on a list-zones response.
    pub zones: FieldPath,
    /// Zone object on get-zone / create-zone responses.
    pub zone: FieldPath,
    /// Change info object on change, get-change and create-zone responses.
    pub change_info: FieldPath,
    /// Name server list on get-zone / create-zone responses.
    pub name_servers: FieldPath,
    /// Record set list on a list-records response.
    pub record_sets: FieldPath,
    /// Value list inside one record set.
    pub resource_records: FieldPath,
    /// Alias target object inside one record set.
    pub alias_target: FieldPath,

    pub is_truncated: &'static str,
    pub next_marker: &'static str,
    pub next_record_name: &'static str,
    pub next_record_type: &'static str,
    pub next_record_identifier: &'static str,
}

/// Route 53 REST/XML API, 2013-04-01.
pub const ROUTE53_XML: ProviderDialect = ProviderDialect {
    name: "route53",
    api_version: "2013-04-01",
    xml_namespace: "https://route53.amazonaws.com/doc/2013-04-01/",
    list_wrapping: ListWrapping::MemberElement,
    zones: &["HostedZones", "HostedZone"],
    zone: &["HostedZone"],
    change_info: &["ChangeInfo"],
    name_servers: &["DelegationSet", "NameServers", "NameServer"],
    record_sets: &["ResourceRecordSets", "ResourceRecordSet"],
    resource_records: &["ResourceRecords", "ResourceRecord"],
    alias_target: &["AliasTarget"],
    is_truncated: "IsTruncated",
    next_marker: "NextMarker",
    next_record_name: "NextRecordName",
    next_record_type: "NextRecordType",
    next_record_identifier: "NextRecordIdentifier",
};

/// SDK-style JSON documents for the same API.
pub const ROUTE53_JSON: ProviderDialect = ProviderDialect {
    name: "route53-json",
    api_version: "2013-04-01",
    xml_namespace: "https://route53.amazonaws.com/doc/2013-04-01/",
    list_wrapping: ListWrapping::Bare,
    zones: &["HostedZones"],
    zone: &["HostedZone"],
    change_info: &["ChangeInfo"],
    name_servers: &["DelegationSet", "NameServers"],
    record_sets: &["ResourceRecordSets"],
    resource_records: &["ResourceRecords"],
    alias_target: &["AliasTarget"],
    is_truncated: "IsTruncated",
    next_marker: "NextMarker",
    next_record_name: "NextRecordName",
    next_record_type: "NextRecordType",
    next_record_identifier: "NextRecordIdentifier",
};

impl ProviderDialect {
    /// Where a record set's value lives inside one resource record entry.
    pub const RESOURCE_RECORD_VALUE: &'static str = "Value";
}
