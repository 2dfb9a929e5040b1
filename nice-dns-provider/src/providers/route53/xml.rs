//! Route 53 XML
//!
//! Responses are decoded into a generic document: each element becomes a key
//! of its parent object, text-only elements become strings, and a name that
//! repeats under one parent becomes an array. A single member is therefore a
//! bare value; the normalizer handles that. Attributes are ignored.
//!
//! Request bodies are written directly, with every text value escaped.

use std::fmt::Write;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use serde_json::{Map, Value};

use crate::types::{ChangeBatch, CreateZoneRequest, Record};

// ============ Decoding ============

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> (String, Value) {
        let value = if self.children.is_empty() {
            Value::String(self.text)
        } else {
            Value::Object(self.children)
        };
        (self.name, value)
    }
}

fn insert_child(parent: &mut Map<String, Value>, name: String, value: Value) {
    match parent.get_mut(&name) {
        None => {
            parent.insert(name, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

/// Decode a response body. Returns the root element name and its content.
pub(crate) fn decode(text: &str) -> Result<(String, Value), String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML error at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(Frame::new(name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, Value::String(String::new())),
                    None => root = Some((name, Value::String(String::new()))),
                }
            }
            Event::Text(t) => {
                if let Some(frame) = stack.last_mut() {
                    let unescaped = t.unescape().map_err(|e| format!("bad text: {e}"))?;
                    frame.text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| "unbalanced closing tag".to_string())?;
                let (name, value) = frame.into_value();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => root = Some((name, value)),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err("unexpected end of document".to_string());
    }
    root.ok_or_else(|| "empty document".to_string())
}

// ============ Encoding ============

fn element(out: &mut String, name: &str, text: &str) {
    let _ = write!(out, "<{name}>{}</{name}>", escape(text));
}

fn write_record(out: &mut String, record: &Record) {
    out.push_str("<ResourceRecordSet>");
    element(out, "Name", &record.name);
    element(out, "Type", &record.record_type);
    if let Some(id) = &record.set_identifier {
        element(out, "SetIdentifier", id);
    }
    if let Some(weight) = record.weight {
        element(out, "Weight", &weight.to_string());
    }
    if record.alias.is_none()
        && let Some(ttl) = record.ttl
    {
        element(out, "TTL", &ttl.to_string());
    }
    if let Some(values) = &record.values {
        out.push_str("<ResourceRecords>");
        for value in values {
            out.push_str("<ResourceRecord>");
            element(out, "Value", value);
            out.push_str("</ResourceRecord>");
        }
        out.push_str("</ResourceRecords>");
    } else if let Some(alias) = &record.alias {
        out.push_str("<AliasTarget>");
        element(out, "HostedZoneId", &alias.hosted_zone_id);
        element(out, "DNSName", &alias.dns_name);
        element(
            out,
            "EvaluateTargetHealth",
            if alias.evaluate_target_health { "true" } else { "false" },
        );
        out.push_str("</AliasTarget>");
    }
    out.push_str("</ResourceRecordSet>");
}

/// `CreateHostedZoneRequest` body. `request.name` is sent as given.
pub(crate) fn create_hosted_zone(namespace: &str, request: &CreateZoneRequest) -> String {
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = write!(out, r#"<CreateHostedZoneRequest xmlns="{namespace}">"#);
    element(&mut out, "Name", &request.name);
    element(&mut out, "CallerReference", request.caller_reference());
    if let Some(comment) = &request.comment {
        out.push_str("<HostedZoneConfig>");
        element(&mut out, "Comment", comment);
        out.push_str("</HostedZoneConfig>");
    }
    out.push_str("</CreateHostedZoneRequest>");
    out
}

/// `ChangeResourceRecordSetsRequest` body. Record names are sent as given.
pub(crate) fn change_resource_record_sets(namespace: &str, batch: &ChangeBatch) -> String {
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = write!(out, r#"<ChangeResourceRecordSetsRequest xmlns="{namespace}">"#);
    out.push_str("<ChangeBatch>");
    if let Some(comment) = &batch.comment {
        element(&mut out, "Comment", comment);
    }
    out.push_str("<Changes>");
    for change in &batch.changes {
        out.push_str("<Change>");
        element(&mut out, "Action", change.action.as_str());
        write_record(&mut out, &change.record);
        out.push_str("</Change>");
    }
    out.push_str("</Changes></ChangeBatch></ChangeResourceRecordSetsRequest>");
    out
}
