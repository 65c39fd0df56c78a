//! Waiting for instances to converge, and reading back their addresses

use super::FleetError;
use crate::aws::{Ec2Operations, InstanceSnapshot, PublicAddress, classify_anyhow_error};
use crate::wait::{WaitConfig, wait_for_resource};
use anyhow::Result;
use course_fleet_common::{InstanceState, RosterEntry};
use std::net::Ipv4Addr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A launched instance and the roster entry it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedInstance {
    pub name: RosterEntry,
    pub instance_id: String,
}

/// Roster entry → public address, in roster order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressMap {
    entries: Vec<(RosterEntry, PublicAddress)>,
}

impl AddressMap {
    pub fn insert(&mut self, name: RosterEntry, address: PublicAddress) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = address,
            None => self.entries.push((name, address)),
        }
    }

    pub fn get(&self, name: &str) -> Option<PublicAddress> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, a)| *a)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RosterEntry, PublicAddress)> {
        self.entries.iter().map(|(n, a)| (n, *a))
    }

    /// Entries that have a concrete address
    pub fn assigned(&self) -> impl Iterator<Item = (&RosterEntry, Ipv4Addr)> {
        self.iter()
            .filter_map(|(n, a)| a.assigned().map(|ip| (n, ip)))
    }

    /// Entries without an address
    pub fn unassigned(&self) -> impl Iterator<Item = &RosterEntry> {
        self.iter()
            .filter(|(_, a)| a.assigned().is_none())
            .map(|(n, _)| n)
    }
}

fn is_running(snapshots: &[InstanceSnapshot], instance_id: &str) -> bool {
    snapshots
        .iter()
        .any(|s| s.instance_id == instance_id && s.state == Some(InstanceState::Running))
}

/// Block until every instance is running.
///
/// Instances not yet visible to describe calls are polled again. An instance
/// that leaves the boot path fails the wait with [`FleetError::InstanceFailed`].
pub async fn await_running<E: Ec2Operations>(
    ec2: &E,
    instance_ids: &[String],
    wait: WaitConfig,
    cancel: Option<&CancellationToken>,
) -> Result<()> {
    if instance_ids.is_empty() {
        return Ok(());
    }

    info!(count = instance_ids.len(), timeout_secs = wait.timeout.as_secs(), "Waiting for instances to be running");

    wait_for_resource(
        wait,
        cancel,
        || async move {
            let snapshots = match ec2.describe_instances(instance_ids).await {
                Ok(snapshots) => snapshots,
                Err(e) if classify_anyhow_error(&e).is_not_found() => {
                    debug!(error = %e, "Instances not visible yet");
                    return Ok(false);
                }
                Err(e) => return Err(e),
            };

            for snapshot in &snapshots {
                if let Some(state) = snapshot.state.filter(|s| s.is_failed_boot()) {
                    return Err(FleetError::InstanceFailed {
                        instance_id: snapshot.instance_id.clone(),
                        state,
                        reason: snapshot
                            .state_reason
                            .clone()
                            .unwrap_or_else(|| "no state reason provided".to_string()),
                    }
                    .into());
                }
            }

            Ok(instance_ids.iter().all(|id| is_running(&snapshots, id)))
        },
        &format!("{} instances running", instance_ids.len()),
    )
    .await
}

/// Block until every instance is terminated.
///
/// Instances the provider no longer reports count as terminated.
pub async fn await_terminated<E: Ec2Operations>(
    ec2: &E,
    instance_ids: &[String],
    wait: WaitConfig,
    cancel: Option<&CancellationToken>,
) -> Result<()> {
    if instance_ids.is_empty() {
        return Ok(());
    }

    info!(count = instance_ids.len(), timeout_secs = wait.timeout.as_secs(), "Waiting for instances to terminate");

    wait_for_resource(
        wait,
        cancel,
        || async move {
            let snapshots = match ec2.describe_instances(instance_ids).await {
                Ok(snapshots) => snapshots,
                Err(e) if classify_anyhow_error(&e).is_not_found() => return Ok(true),
                Err(e) => return Err(e),
            };

            Ok(instance_ids.iter().all(|id| {
                snapshots
                    .iter()
                    .find(|s| &s.instance_id == id)
                    .is_none_or(|s| s.state == Some(InstanceState::Terminated))
            }))
        },
        &format!("{} instances terminated", instance_ids.len()),
    )
    .await
}

/// Read each instance's public address, one describe call per instance
pub async fn collect_addresses<E: Ec2Operations>(
    ec2: &E,
    instances: &[ProvisionedInstance],
) -> Result<AddressMap> {
    let mut addresses = AddressMap::default();

    for instance in instances {
        let snapshots = ec2
            .describe_instances(std::slice::from_ref(&instance.instance_id))
            .await?;
        let reported = snapshots.first().and_then(|s| s.public_ip.as_deref());
        let address = PublicAddress::from_reported(reported);

        debug!(name = %instance.name, instance_id = %instance.instance_id, %address, "Collected address");
        addresses.insert(instance.name.clone(), address);
    }

    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> RosterEntry {
        RosterEntry::parse(name).unwrap()
    }

    #[test]
    fn test_address_map_keeps_roster_order() {
        let mut map = AddressMap::default();
        map.insert(entry("coleman"), PublicAddress::Assigned(Ipv4Addr::new(1, 1, 1, 1)));
        map.insert(entry("caine"), PublicAddress::Unassigned);
        map.insert(entry("lansing"), PublicAddress::Assigned(Ipv4Addr::new(2, 2, 2, 2)));

        let names: Vec<&str> = map.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["coleman", "caine", "lansing"]);
        assert_eq!(map.assigned().count(), 2);
        assert_eq!(
            map.unassigned().map(|n| n.as_str()).collect::<Vec<_>>(),
            vec!["caine"]
        );
    }

    #[test]
    fn test_address_map_insert_replaces() {
        let mut map = AddressMap::default();
        map.insert(entry("caine"), PublicAddress::Unassigned);
        map.insert(entry("caine"), PublicAddress::Assigned(Ipv4Addr::new(3, 3, 3, 3)));
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get("caine"),
            Some(PublicAddress::Assigned(Ipv4Addr::new(3, 3, 3, 3)))
        );
    }
}
