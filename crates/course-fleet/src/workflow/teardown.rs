//! Teardown workflow: reclaim everything tagged with a course

use super::access_group::{GroupDeletion, delete_access_group};
use super::converge::await_terminated;
use super::discovery::{CourseInstance, discover_course_instances};
use super::naming::{DeleteOutcome, delete_records, resolve_zone};
use super::progress::{ProgressEvent, ProgressReporter};
use crate::aws::tags::{leading_label, security_group_name};
use crate::aws::{Ec2Operations, Route53Operations};
use crate::config::FleetConfig;
use anyhow::Result;
use course_fleet_common::CourseId;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// What teardown found and removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Instances that were terminated
    pub instances: Vec<CourseInstance>,
    /// None when teardown stopped before reaching the security group
    pub group: Option<GroupDeletion>,
    /// None when there was no hosted zone or nothing to reclaim
    pub dns: Option<DeleteOutcome>,
}

/// Runs the teardown workflow against a compute and a naming provider
pub struct Teardown<'a, E, R> {
    ec2: &'a E,
    route53: &'a R,
    config: &'a FleetConfig,
    reporter: &'a dyn ProgressReporter,
    cancel: Option<CancellationToken>,
}

impl<'a, E: Ec2Operations, R: Route53Operations> Teardown<'a, E, R> {
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

    /// Abort the termination wait when `token` is cancelled
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[instrument(skip_all, fields(course = %course))]
    pub async fn run(&self, course: &CourseId) -> Result<TeardownReport> {
        let instances = discover_course_instances(self.ec2, course).await?;
        if instances.is_empty() {
            self.reporter.report(ProgressEvent::NoInstancesFound {
                course: course.to_string(),
            });
            return Ok(TeardownReport::default());
        }

        self.reporter.report(ProgressEvent::Terminating {
            count: instances.len(),
        });
        for instance in &instances {
            self.reporter.report(ProgressEvent::TerminatingInstance {
                instance_id: instance.instance_id.clone(),
                name: instance.name.clone(),
            });
        }

        let ids: Vec<String> = instances.iter().map(|i| i.instance_id.clone()).collect();
        self.ec2.terminate_instances(&ids).await?;

        self.reporter.report(ProgressEvent::WaitingForTermination);
        await_terminated(
            self.ec2,
            &ids,
            self.config.wait.terminated_wait(),
            self.cancel.as_ref(),
        )
        .await?;

        let group = self.delete_group(course).await?;
        let dns = self.delete_dns(&instances).await?;

        self.reporter.report(ProgressEvent::TeardownComplete);
        info!(instances = instances.len(), ?group, "Teardown complete");

        Ok(TeardownReport {
            instances,
            group: Some(group),
            dns,
        })
    }

    async fn delete_group(&self, course: &CourseId) -> Result<GroupDeletion> {
        let name = security_group_name(course.as_str());
        self.reporter
            .report(ProgressEvent::DeletingGroup { name: name.clone() });

        let outcome = delete_access_group(self.ec2, &name).await?;
        if outcome == GroupDeletion::NotFound {
            self.reporter.report(ProgressEvent::GroupNotFound { name });
        }
        Ok(outcome)
    }

    async fn delete_dns(&self, instances: &[CourseInstance]) -> Result<Option<DeleteOutcome>> {
        let Some(zone) = resolve_zone(self.route53, &self.config.domain).await? else {
            self.reporter.report(ProgressEvent::ZoneNotFound {
                domain: self.config.domain.clone(),
            });
            return Ok(None);
        };

        // raw Name tags: records may exist for names provisioning would now reject
        let names: Vec<&str> = instances
            .iter()
            .filter_map(|i| {
                if i.name.is_empty() {
                    warn!(instance_id = %i.instance_id, "Instance has no Name tag, no record to delete");
                    None
                } else {
                    Some(i.name.as_str())
                }
            })
            .collect();

        let outcome = delete_records(self.route53, &zone, &names).await?;
        match &outcome {
            DeleteOutcome::Deleted { records, .. } => {
                for record in records {
                    self.reporter.report(ProgressEvent::DeletingRecord {
                        label: leading_label(&record.name).to_string(),
                    });
                }
                self.reporter.report(ProgressEvent::RecordsDeleted);
            }
            DeleteOutcome::NothingToDelete => {
                self.reporter.report(ProgressEvent::NoRecordsToDelete);
            }
        }

        Ok(Some(outcome))
    }
}
