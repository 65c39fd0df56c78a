//! Route 53 operations trait for testing

use super::Route53Client;
use super::types::{HostedZone, RecordChange, RecordSet};
use anyhow::Result;
use std::future::Future;

/// Trait for Route 53 operations that can be simulated in tests.
pub trait Route53Operations: Send + Sync {
    /// Zones returned for a DNS name query (may include neighbouring names)
    fn list_zones_by_name(
        &self,
        dns_name: &str,
    ) -> impl Future<Output = Result<Vec<HostedZone>>> + Send;

    /// Every record set in a zone
    fn list_records(&self, zone_id: &str) -> impl Future<Output = Result<Vec<RecordSet>>> + Send;

    /// Submit an atomic change batch, returning the change id
    fn change_records(
        &self,
        zone_id: &str,
        changes: Vec<RecordChange>,
    ) -> impl Future<Output = Result<String>> + Send;
}

impl Route53Operations for Route53Client {
    async fn list_zones_by_name(&self, dns_name: &str) -> Result<Vec<HostedZone>> {
        Route53Client::list_zones_by_name(self, dns_name).await
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<RecordSet>> {
        Route53Client::list_records(self, zone_id).await
    }

    async fn change_records(&self, zone_id: &str, changes: Vec<RecordChange>) -> Result<String> {
        Route53Client::change_records(self, zone_id, changes).await
    }
}
