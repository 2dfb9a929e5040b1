//! CLI argument parsing and command dispatch.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nice_dns_provider::{
    AliasTarget, ClientConfig, CreateZoneRequest, DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES,
    DEFAULT_REGION, DelRecordRequest, DnsClient, ProviderCredentials, SetRecordRequest, Tracked,
};
use serde::Serialize;

use crate::output::{follow, print_json};

/// Convenience client for Route 53 hosted zones.
#[derive(Parser)]
#[command(name = "nice-dns")]
#[command(version)]
#[command(about = "Convenience client for Route 53 hosted zones")]
#[command(long_about = "Look zones up by name, set or delete records by name and type, \
    and wait for changes to propagate. Results are printed as JSON.")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options available to all commands.
#[derive(Args, Clone)]
pub struct GlobalOptions {
    #[arg(long, env = "AWS_ACCESS_KEY_ID", global = true, hide_env_values = true)]
    pub access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", global = true, hide_env_values = true)]
    pub secret_access_key: Option<String>,

    #[arg(long, env = "AWS_SESSION_TOKEN", global = true, hide_env_values = true)]
    pub session_token: Option<String>,

    /// API endpoint.
    #[arg(long, env = "NICE_DNS_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    pub endpoint: String,

    /// Signing region.
    #[arg(long, env = "NICE_DNS_REGION", default_value = DEFAULT_REGION, global = true)]
    pub region: String,

    /// Retries for read requests on transport errors and throttling.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES, global = true)]
    pub max_retries: u32,

    /// Enable debug logging.
    #[arg(short = 'v', long = "verbose", global = true)]
    pub is_verbose: bool,

    /// Suppress all logging output.
    #[arg(short = 'q', long = "quiet", global = true)]
    pub is_quiet: bool,
}

impl GlobalOptions {
    pub fn client_config(&self) -> Result<ClientConfig> {
        let access_key_id = self
            .access_key_id
            .clone()
            .context("missing access key id (--access-key-id or AWS_ACCESS_KEY_ID)")?;
        let secret_access_key = self
            .secret_access_key
            .clone()
            .context("missing secret access key (--secret-access-key or AWS_SECRET_ACCESS_KEY)")?;

        let mut config = ClientConfig::new(ProviderCredentials::Route53 {
            access_key_id,
            secret_access_key,
            session_token: self.session_token.clone(),
        });
        config.endpoint.clone_from(&self.endpoint);
        config.region.clone_from(&self.region);
        config.max_retries = self.max_retries;
        Ok(config)
    }
}

/// Polling option shared by every mutating command.
#[derive(Args, Clone, Copy)]
pub struct PollArgs {
    /// Poll the change every SECONDS and print each event until it is in sync.
    #[arg(long, value_name = "SECONDS")]
    pub poll: Option<u64>,
}

impl PollArgs {
    fn interval(self) -> Option<Duration> {
        self.poll.map(Duration::from_secs)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every hosted zone.
    Zones {
        /// Start listing at this zone id.
        #[arg(long)]
        marker: Option<String>,
    },

    /// Show one zone, by id or domain name.
    ZoneInfo {
        /// Zone id or domain name.
        zone: String,
    },

    /// Create a hosted zone.
    CreateZone {
        /// Zone apex, e.g. example.com.
        name: String,

        /// Caller reference; defaults to the zone name.
        #[arg(long)]
        reference: Option<String>,

        #[arg(long)]
        comment: Option<String>,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// List every record set of a zone.
    Records {
        /// Zone id or domain name.
        zone: String,
    },

    /// Make the zone contain exactly this record, replacing a match.
    SetRecord(RecordArgs),

    /// Create or replace a record in one step.
    UpsertRecord(RecordArgs),

    /// Delete every record matching name and type.
    DelRecord {
        /// Zone id or domain name.
        zone: String,

        /// Record name.
        name: String,

        #[arg(short = 't', long = "type")]
        record_type: String,

        #[arg(long)]
        set_identifier: Option<String>,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Show the status of a change.
    GetChange {
        /// Change id, with or without the /change/ prefix.
        change_id: String,

        #[command(flatten)]
        poll: PollArgs,
    },
}

#[derive(Args)]
pub struct RecordArgs {
    /// Zone id or domain name.
    pub zone: String,

    /// Record name.
    pub name: String,

    #[arg(short = 't', long = "type")]
    pub record_type: String,

    #[arg(long, default_value_t = 300)]
    pub ttl: u32,

    /// Record value; repeat for several values.
    #[arg(long = "value", conflicts_with = "alias_dns_name")]
    pub values: Vec<String>,

    /// Alias target DNS name (instead of values).
    #[arg(long, requires = "alias_zone_id")]
    pub alias_dns_name: Option<String>,

    /// Hosted zone id of the alias target.
    #[arg(long, requires = "alias_dns_name")]
    pub alias_zone_id: Option<String>,

    #[arg(long, requires = "alias_dns_name")]
    pub evaluate_target_health: bool,

    #[arg(long)]
    pub set_identifier: Option<String>,

    #[arg(long)]
    pub weight: Option<u32>,

    /// Comment attached to the change batch.
    #[arg(long)]
    pub comment: Option<String>,

    #[command(flatten)]
    pub poll: PollArgs,
}

impl RecordArgs {
    fn request(self) -> SetRecordRequest {
        let alias = match (self.alias_dns_name, self.alias_zone_id) {
            (Some(dns_name), Some(hosted_zone_id)) => Some(AliasTarget {
                hosted_zone_id,
                dns_name,
                evaluate_target_health: self.evaluate_target_health,
            }),
            _ => None,
        };
        SetRecordRequest {
            zone_id: self.zone,
            name: self.name,
            record_type: self.record_type,
            ttl: self.ttl,
            values: (!self.values.is_empty()).then_some(self.values),
            alias,
            set_identifier: self.set_identifier,
            weight: self.weight,
            comment: self.comment,
        }
    }
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Zones { .. } => "zones",
            Self::ZoneInfo { .. } => "zone-info",
            Self::CreateZone { .. } => "create-zone",
            Self::Records { .. } => "records",
            Self::SetRecord(_) => "set-record",
            Self::UpsertRecord(_) => "upsert-record",
            Self::DelRecord { .. } => "del-record",
            Self::GetChange { .. } => "get-change",
        }
    }

    /// Run the command and print its result.
    pub async fn run(self, client: &DnsClient) -> Result<ExitCode> {
        tracing::debug!("Running {}", self.name());

        match self {
            Self::Zones { marker } => {
                print_json(&client.list_zones_from(marker.as_deref()).await?)?;
            }
            Self::ZoneInfo { zone } => {
                print_json(&client.resolve_zone(&zone).await?)?;
            }
            Self::CreateZone {
                name,
                reference,
                comment,
                poll,
            } => {
                let request = CreateZoneRequest {
                    name,
                    reference,
                    comment,
                };
                let tracked = client.create_zone(&request, poll.interval()).await?;
                return finish(tracked).await;
            }
            Self::Records { zone } => {
                print_json(&client.list_records(&zone).await?)?;
            }
            Self::SetRecord(args) => {
                let poll = args.poll.interval();
                let tracked = client.set_record(&args.request(), poll).await?;
                return finish(tracked).await;
            }
            Self::UpsertRecord(args) => {
                let poll = args.poll.interval();
                let tracked = client.upsert_record(&args.request(), poll).await?;
                return finish(tracked).await;
            }
            Self::DelRecord {
                zone,
                name,
                record_type,
                set_identifier,
                poll,
            } => {
                let request = DelRecordRequest {
                    zone_id: zone,
                    name,
                    record_type,
                    set_identifier,
                };
                let tracked = client.del_record(&request, poll.interval()).await?;
                return finish(tracked).await;
            }
            Self::GetChange { change_id, poll } => match poll.interval() {
                Some(every) => {
                    let watch = client.poll_change_until_in_sync(&change_id, every)?;
                    return follow(watch).await;
                }
                None => print_json(&client.get_change_status(&change_id).await?)?,
            },
        }

        Ok(ExitCode::SUCCESS)
    }
}

/// Print a mutation result, then follow its watch if polling was requested.
async fn finish<T: Serialize>(tracked: Tracked<T>) -> Result<ExitCode> {
    let (value, watch) = tracked.into_parts();
    print_json(&value)?;
    match watch {
        Some(watch) => follow(watch).await,
        None => Ok(ExitCode::SUCCESS),
    }
}
