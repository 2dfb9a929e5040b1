//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::env;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use nice_dns_provider::{
    ApiFault, ChangeBatch, ClientConfig, CreateZoneRequest, DnsApi, DnsClient, DnsError,
    ProviderCredentials, ProviderDialect, ROUTE53_XML, RecordCursor, Result,
};
use serde_json::{Value, json};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

// ============ Mock provider ============

/// Provider operation, used to script responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListZones,
    GetZone,
    CreateZone,
    ListRecords,
    ChangeRecordSets,
    GetChange,
}

/// One recorded provider call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListZones {
        marker: Option<String>,
    },
    GetZone {
        zone_id: String,
    },
    CreateZone {
        name: String,
        reference: Option<String>,
        comment: Option<String>,
    },
    ListRecords {
        zone_id: String,
        cursor: Option<RecordCursor>,
    },
    ChangeRecordSets {
        zone_id: String,
        batch: ChangeBatch,
    },
    GetChange {
        change_id: String,
    },
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Self::ListZones { .. } => Op::ListZones,
            Self::GetZone { .. } => Op::GetZone,
            Self::CreateZone { .. } => Op::CreateZone,
            Self::ListRecords { .. } => Op::ListRecords,
            Self::ChangeRecordSets { .. } => Op::ChangeRecordSets,
            Self::GetChange { .. } => Op::GetChange,
        }
    }
}

/// Scripted provider: every operation answers from its own queue, in order,
/// and every call is recorded. An operation with nothing scripted fails.
pub struct MockDnsApi {
    dialect: &'static ProviderDialect,
    script: Mutex<HashMap<Op, VecDeque<Result<Value>>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockDnsApi {
    pub fn new() -> Arc<Self> {
        Self::with_dialect(&ROUTE53_XML)
    }

    pub fn with_dialect(dialect: &'static ProviderDialect) -> Arc<Self> {
        Arc::new(Self {
            dialect,
            script: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Queue one response for `op`.
    pub fn script(&self, op: Op, response: Result<Value>) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(op)
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| c.op() == op).count()
    }

    /// Every change batch submitted so far.
    pub fn batches(&self) -> Vec<ChangeBatch> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ChangeRecordSets { batch, .. } => Some(batch),
                _ => None,
            })
            .collect()
    }

    fn answer(&self, call: Call) -> Result<Value> {
        let op = call.op();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&op)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(DnsError::Provider {
                    provider: "mock".to_string(),
                    fault: ApiFault::new("Unscripted", format!("no response scripted for {op:?}")),
                })
            })
    }
}

#[async_trait]
impl DnsApi for MockDnsApi {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn dialect(&self) -> &'static ProviderDialect {
        self.dialect
    }

    async fn list_zones(&self, marker: Option<&str>) -> Result<Value> {
        self.answer(Call::ListZones {
            marker: marker.map(str::to_string),
        })
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Value> {
        self.answer(Call::GetZone {
            zone_id: zone_id.to_string(),
        })
    }

    async fn create_zone(&self, request: &CreateZoneRequest) -> Result<Value> {
        self.answer(Call::CreateZone {
            name: request.name.clone(),
            reference: request.reference.clone(),
            comment: request.comment.clone(),
        })
    }

    async fn list_records(&self, zone_id: &str, cursor: Option<&RecordCursor>) -> Result<Value> {
        self.answer(Call::ListRecords {
            zone_id: zone_id.to_string(),
            cursor: cursor.cloned(),
        })
    }

    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<Value> {
        self.answer(Call::ChangeRecordSets {
            zone_id: zone_id.to_string(),
            batch: batch.clone(),
        })
    }

    async fn get_change(&self, change_id: &str) -> Result<Value> {
        self.answer(Call::GetChange {
            change_id: change_id.to_string(),
        })
    }
}

/// Client over `mock`.
pub fn client(mock: &Arc<MockDnsApi>) -> DnsClient {
    DnsClient::new(Arc::clone(mock) as Arc<dyn DnsApi>)
}

// ============ Route 53 shaped documents ============
//
// Shapes match what the XML decoder produces: scalars as text, list members
// under their member element.

pub const SUBMITTED_AT: &str = "2024-05-01T12:00:00.000Z";

pub fn hosted_zone(id: &str, name: &str) -> Value {
    json!({
        "Id": format!("/hostedzone/{id}"),
        "Name": format!("{name}."),
        "CallerReference": format!("ref-{id}"),
        "Config": { "PrivateZone": "false" },
        "ResourceRecordSetCount": "2",
    })
}

/// One page of a list-zones response.
pub fn zones_page(zones: Vec<Value>, next_marker: Option<&str>) -> Value {
    let mut doc = json!({
        "HostedZones": { "HostedZone": zones },
        "IsTruncated": if next_marker.is_some() { "true" } else { "false" },
        "MaxItems": "100",
    });
    if let Some(marker) = next_marker {
        doc["NextMarker"] = json!(marker);
    }
    doc
}

pub fn get_zone_response(id: &str, name: &str) -> Value {
    json!({
        "HostedZone": hosted_zone(id, name),
        "DelegationSet": {
            "NameServers": {
                "NameServer": ["ns-1.awsdns-01.org", "ns-2.awsdns-02.com"]
            }
        },
    })
}

pub fn create_zone_response(id: &str, name: &str, change_id: &str) -> Value {
    let mut doc = get_zone_response(id, name);
    doc["ChangeInfo"] = change_info(change_id, "PENDING");
    doc
}

/// A plain record set as listed (name with trailing dot, TTL as text).
pub fn record_set(name: &str, record_type: &str, ttl: u32, values: &[&str]) -> Value {
    let values: Vec<Value> = values.iter().map(|v| json!({ "Value": v })).collect();
    json!({
        "Name": format!("{name}."),
        "Type": record_type,
        "TTL": ttl.to_string(),
        "ResourceRecords": { "ResourceRecord": values },
    })
}

/// A weighted record set.
pub fn weighted_set(
    name: &str,
    record_type: &str,
    set_identifier: &str,
    weight: u32,
    values: &[&str],
) -> Value {
    let mut set = record_set(name, record_type, 60, values);
    set["SetIdentifier"] = json!(set_identifier);
    set["Weight"] = json!(weight.to_string());
    set
}

/// One page of a list-records response.
pub fn records_page(sets: Vec<Value>, next: Option<(&str, &str)>) -> Value {
    let mut doc = json!({
        "ResourceRecordSets": { "ResourceRecordSet": sets },
        "IsTruncated": if next.is_some() { "true" } else { "false" },
        "MaxItems": "300",
    });
    if let Some((name, record_type)) = next {
        doc["NextRecordName"] = json!(name);
        doc["NextRecordType"] = json!(record_type);
    }
    doc
}

/// Add the set identifier part of a continuation cursor to a records page.
pub fn with_next_identifier(mut page: Value, identifier: &str) -> Value {
    page["NextRecordIdentifier"] = json!(identifier);
    page
}

pub fn change_info(change_id: &str, status: &str) -> Value {
    json!({
        "Id": format!("/change/{change_id}"),
        "Status": status,
        "SubmittedAt": SUBMITTED_AT,
    })
}

/// Response of a change submission or get-change call.
pub fn change_response(change_id: &str, status: &str) -> Value {
    json!({ "ChangeInfo": change_info(change_id, status) })
}

/// The rejection Route 53 sends when a batch no longer fits the zone.
pub fn invalid_change_batch(message: &str) -> DnsError {
    DnsError::InvalidChangeBatch {
        provider: "mock".to_string(),
        fault: ApiFault::new("InvalidChangeBatch", message)
            .with_status(400)
            .with_type("Sender"),
    }
}

// ============ Live tests ============

/// 生成唯一的测试记录名称
pub fn generate_test_record_name(zone: &str) -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}.{zone}", &uuid.to_string()[..8])
}

/// 测试上下文 - 封装 Client 和测试 zone
pub struct TestContext {
    pub client: DnsClient,
    pub zone: String,
}

impl TestContext {
    /// 创建 Route 53 测试上下文
    pub fn route53() -> Option<Self> {
        let access_key_id = env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        let zone = env::var("TEST_ZONE").ok()?;

        let config = ClientConfig::new(ProviderCredentials::Route53 {
            access_key_id,
            secret_access_key,
            session_token: env::var("AWS_SESSION_TOKEN").ok(),
        });
        let client = DnsClient::from_config(config).ok()?;

        Some(Self { client, zone })
    }
}
