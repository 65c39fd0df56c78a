//! Provisioning workflow: one instance and one DNS record per roster entry

use super::access_group::create_access_group;
use super::converge::{AddressMap, ProvisionedInstance, await_running, collect_addresses};
use super::image::resolve_latest_image;
use super::naming::{resolve_zone, upsert_records};
use super::progress::{ProgressEvent, ProgressReporter};
use super::FleetError;
use crate::aws::{Ec2Operations, HostedZone, LaunchInstanceConfig, Route53Operations};
use crate::config::FleetConfig;
use anyhow::Result;
use aws_sdk_ec2::types::InstanceType;
use course_fleet_common::{CourseId, Roster, RosterEntry};
use std::net::Ipv4Addr;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Everything provisioning created, in roster order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub image_id: String,
    pub group_id: String,
    pub instances: Vec<ProvisionedInstance>,
    pub addresses: AddressMap,
    /// Change id of the DNS batch, if one was sent
    pub change_id: Option<String>,
}

/// Reject instance types EC2 does not list before anything is created
pub fn validate_instance_type(instance_type: &str) -> Result<(), FleetError> {
    if InstanceType::values().contains(&instance_type) {
        Ok(())
    } else {
        Err(FleetError::InvalidInstanceType(instance_type.to_string()))
    }
}

/// Runs the provisioning workflow against a compute and a naming provider
pub struct Provisioner<'a, E, R> {
    ec2: &'a E,
    route53: &'a R,
    config: &'a FleetConfig,
    reporter: &'a dyn ProgressReporter,
    cancel: Option<CancellationToken>,
}

impl<'a, E: Ec2Operations, R: Route53Operations> Provisioner<'a, E, R> {
    pub fn new(
        ec2: &'a E,
        route53: &'a R,
        config: &'a FleetConfig,
        reporter: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            ec2,
            route53,
            config,
            reporter,
            cancel: None,
        }
    }

    /// Abort the running-wait when `token` is cancelled
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Provision the whole course: compute first, then DNS.
    ///
    /// The hosted zone is resolved before anything is created so a missing
    /// zone leaves no instances behind.
    #[instrument(skip_all, fields(course = %course, students = roster.len()))]
    pub async fn run(&self, course: &CourseId, roster: &Roster) -> Result<ProvisionReport> {
        validate_instance_type(&self.config.instance_size)?;

        let zone = resolve_zone(self.route53, &self.config.domain)
            .await?
            .ok_or_else(|| FleetError::ZoneNotFound {
                domain: self.config.domain.clone(),
            })?;

        let mut report = self.compute(course, roster).await?;
        report.change_id = self.publish_records(&zone, &report.addresses).await?;

        info!(
            instances = report.instances.len(),
            change_id = ?report.change_id,
            "Provisioning complete"
        );

        Ok(report)
    }

    /// Compute phase: image, security group, instances, running, addresses
    pub async fn provision_instances(
        &self,
        course: &CourseId,
        roster: &Roster,
    ) -> Result<ProvisionReport> {
        validate_instance_type(&self.config.instance_size)?;
        self.compute(course, roster).await
    }

    /// Compute phase after the instance type has been checked
    async fn compute(&self, course: &CourseId, roster: &Roster) -> Result<ProvisionReport> {
        self.reporter.report(ProgressEvent::FetchingImage);
        let image_id = resolve_latest_image(self.ec2, &self.config.image).await?;
        self.reporter.report(ProgressEvent::ImageSelected {
            image_id: image_id.clone(),
        });

        let group_id = create_access_group(self.ec2, course, self.config).await?;
        self.reporter.report(ProgressEvent::GroupCreated {
            group_id: group_id.clone(),
        });

        let instances = self.launch(course, roster, &image_id, &group_id).await?;

        self.reporter.report(ProgressEvent::WaitingForRunning);
        let ids: Vec<String> = instances.iter().map(|i| i.instance_id.clone()).collect();
        await_running(
            self.ec2,
            &ids,
            self.config.wait.running_wait(),
            self.cancel.as_ref(),
        )
        .await?;
        self.reporter.report(ProgressEvent::InstancesRunning);

        let addresses = collect_addresses(self.ec2, &instances).await?;
        self.reporter.report(ProgressEvent::AddressHeader);
        for (name, address) in addresses.iter() {
            self.reporter.report(ProgressEvent::Address {
                name: name.to_string(),
                address,
            });
        }

        Ok(ProvisionReport {
            image_id,
            group_id,
            instances,
            addresses,
            change_id: None,
        })
    }

    /// Launch one instance per roster entry, in order; the first failure stops the rest
    async fn launch(
        &self,
        course: &CourseId,
        roster: &Roster,
        image_id: &str,
        group_id: &str,
    ) -> Result<Vec<ProvisionedInstance>> {
        let mut instances = Vec::with_capacity(roster.len());

        for entry in roster {
            self.reporter.report(ProgressEvent::Launching {
                name: entry.to_string(),
            });

            let launch = LaunchInstanceConfig::new(
                course.as_str(),
                entry.as_str(),
                image_id,
                &self.config.instance_size,
                &self.config.key_pair,
                group_id,
            );
            let launched = self.ec2.launch_instance(launch).await?;

            self.reporter.report(ProgressEvent::Launched {
                name: entry.to_string(),
                instance_id: launched.instance_id.clone(),
            });
            instances.push(ProvisionedInstance {
                name: entry.clone(),
                instance_id: launched.instance_id,
            });
        }

        Ok(instances)
    }

    /// DNS phase: upsert a record for every entry with an address
    pub async fn publish_records(
        &self,
        zone: &HostedZone,
        addresses: &AddressMap,
    ) -> Result<Option<String>> {
        for name in addresses.unassigned() {
            self.reporter.report(ProgressEvent::SkippingRecord {
                name: name.to_string(),
            });
        }

        let mappings: Vec<(RosterEntry, Ipv4Addr)> = addresses
            .assigned()
            .map(|(name, ip)| (name.clone(), ip))
            .collect();

        let change_id = upsert_records(
            self.route53,
            zone,
            &self.config.domain,
            &mappings,
            self.config.record_ttl,
        )
        .await?;

        match &change_id {
            Some(change_id) => self.reporter.report(ProgressEvent::RecordsCreated {
                change_id: change_id.clone(),
            }),
            None => self.reporter.report(ProgressEvent::NoRecordsToCreate),
        }

        Ok(change_id)
    }
}
