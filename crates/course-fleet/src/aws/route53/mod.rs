//! Route 53 hosted zone and record management

mod operations;
mod types;

pub use operations::Route53Operations;
pub use types::{ChangeAction, HostedZone, RecordChange, RecordSet};

use crate::aws::context::{AwsContext, FromAwsContext};
use anyhow::{Context, Result};
use aws_sdk_route53::Client;
use aws_sdk_route53::types::{
    Change, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use tracing::{debug, info};

/// Route 53 client for course DNS records
pub struct Route53Client {
    client: Client,
}

impl FromAwsContext for Route53Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.route53_client(),
        }
    }
}

fn to_sdk_change(change: RecordChange) -> Result<Change> {
    let RecordChange { action, record } = change;

    let mut builder = ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(RrType::from(record.record_type.as_str()))
        .set_ttl(record.ttl);
    for value in &record.values {
        builder = builder.resource_records(
            ResourceRecord::builder()
                .value(value)
                .build()
                .context("Invalid resource record")?,
        );
    }
    let record_set = builder
        .build()
        .with_context(|| format!("Invalid record set '{}'", record.name))?;

    let sdk_action = match action {
        ChangeAction::Upsert => aws_sdk_route53::types::ChangeAction::Upsert,
        ChangeAction::Delete => aws_sdk_route53::types::ChangeAction::Delete,
    };

    Change::builder()
        .action(sdk_action)
        .resource_record_set(record_set)
        .build()
        .context("Invalid record change")
}

impl Route53Client {
    /// Create a new Route 53 client (loads AWS config from environment)
    pub async fn new(region: &str) -> Result<Self> {
        let ctx = AwsContext::new(region).await;
        Ok(Self::from_context(&ctx))
    }

    /// List hosted zones starting at `dns_name` in lexical order
    pub async fn list_zones_by_name(&self, dns_name: &str) -> Result<Vec<HostedZone>> {
        let response = self
            .client
            .list_hosted_zones_by_name()
            .dns_name(dns_name)
            .send()
            .await
            .with_context(|| format!("Failed to list hosted zones for '{dns_name}'"))?;

        Ok(response
            .hosted_zones()
            .iter()
            .map(|z| HostedZone::new(z.id(), z.name()))
            .collect())
    }

    /// List every record set in a zone, following pagination
    pub async fn list_records(&self, zone_id: &str) -> Result<Vec<RecordSet>> {
        let mut records = Vec::new();
        let mut start_name: Option<String> = None;
        let mut start_type: Option<RrType> = None;

        loop {
            let response = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(zone_id)
                .set_start_record_name(start_name.take())
                .set_start_record_type(start_type.take())
                .send()
                .await
                .with_context(|| format!("Failed to list records in zone {zone_id}"))?;

            records.extend(response.resource_record_sets().iter().map(|r| RecordSet {
                name: r.name().to_string(),
                record_type: r.r#type().as_str().to_string(),
                ttl: r.ttl(),
                values: r
                    .resource_records()
                    .iter()
                    .map(|v| v.value().to_string())
                    .collect(),
                is_alias: r.alias_target().is_some(),
            }));

            if !response.is_truncated() {
                break;
            }
            start_name = response.next_record_name().map(str::to_string);
            start_type = response.next_record_type().cloned();
            if start_name.is_none() {
                break;
            }
        }

        debug!(zone_id, count = records.len(), "Listed record sets");

        Ok(records)
    }

    /// Submit a single atomic change batch
    pub async fn change_records(&self, zone_id: &str, changes: Vec<RecordChange>) -> Result<String> {
        let count = changes.len();
        let mut batch = ChangeBatch::builder();
        for change in changes {
            batch = batch.changes(to_sdk_change(change)?);
        }
        let batch = batch.build().context("Invalid change batch")?;

        let response = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .with_context(|| format!("Failed to change records in zone {zone_id}"))?;

        let change_id = response
            .change_info()
            .map(|info| info.id().to_string())
            .context("No change info in response")?;

        info!(zone_id, count, change_id = %change_id, "Submitted DNS change batch");

        Ok(change_id)
    }
}
