//! EC2 instance lifecycle operations

use super::Ec2Client;
use super::types::{InstanceSnapshot, LaunchInstanceConfig, LaunchedInstance};
use crate::aws::tags;
use anyhow::{Context, Result};
use aws_sdk_ec2::types::{Filter, Instance, InstanceType, ResourceType};
use course_fleet_common::InstanceState;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Convert an SDK instance description into a snapshot
fn snapshot_from_sdk(instance: &Instance) -> Option<InstanceSnapshot> {
    let instance_id = instance.instance_id()?.to_string();

    let state = instance
        .state()
        .and_then(|s| s.name())
        .and_then(|name| InstanceState::parse(name.as_str()));

    let state_reason = instance.state_reason().map(|r| {
        format!(
            "{}: {}",
            r.code().unwrap_or("unknown"),
            r.message().unwrap_or("no message provided")
        )
    });

    let tags: BTreeMap<String, String> = instance
        .tags()
        .iter()
        .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
        .collect();

    Some(InstanceSnapshot {
        instance_id,
        state,
        state_reason,
        public_ip: instance.public_ip_address().map(str::to_string),
        tags,
    })
}

impl Ec2Client {
    /// Launch exactly one instance for a roster entry
    pub async fn launch_instance(&self, config: LaunchInstanceConfig) -> Result<LaunchedInstance> {
        let instance_type: InstanceType = config
            .instance_type
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid instance type: {}", config.instance_type))?;

        info!(
            name = %config.name,
            course = %config.course,
            instance_type = %config.instance_type,
            image_id = %config.image_id,
            "Launching instance"
        );

        let response = self
            .client
            .run_instances()
            .image_id(&config.image_id)
            .instance_type(instance_type)
            .key_name(&config.key_name)
            .security_group_ids(&config.security_group_id)
            .min_count(1)
            .max_count(1)
            .tag_specifications(tags::ec2_tag_spec(
                ResourceType::Instance,
                &config.course,
                &config.name,
            ))
            .send()
            .await
            .with_context(|| format!("Failed to launch instance for '{}'", config.name))?;

        let instance_id = response
            .instances()
            .first()
            .and_then(|i| i.instance_id())
            .context("No instance ID in launch response")?
            .to_string();

        info!(instance_id = %instance_id, name = %config.name, "Instance launched");

        Ok(LaunchedInstance { instance_id })
    }

    /// Describe specific instances across all returned reservations
    pub async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<InstanceSnapshot>> {
        if instance_ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .describe_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .context("Failed to describe instances")?;

        Ok(response
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .filter_map(snapshot_from_sdk)
            .collect())
    }

    /// Find live instances carrying the tag `key=value`, following pagination
    pub async fn find_instances_by_tag(&self, key: &str, value: &str) -> Result<Vec<InstanceSnapshot>> {
        let live_states: Vec<String> = InstanceState::LIVE
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .describe_instances()
                .filters(
                    Filter::builder()
                        .name(format!("tag:{key}"))
                        .values(value)
                        .build(),
                )
                .filters(
                    Filter::builder()
                        .name("instance-state-name")
                        .set_values(Some(live_states.clone()))
                        .build(),
                )
                .set_next_token(next_token.take())
                .send()
                .await
                .with_context(|| format!("Failed to find instances tagged {key}={value}"))?;

            instances.extend(
                response
                    .reservations()
                    .iter()
                    .flat_map(|r| r.instances())
                    .filter_map(snapshot_from_sdk),
            );

            match response.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(key, value, count = instances.len(), "Found tagged instances");

        Ok(instances)
    }

    /// Terminate multiple instances in a single API call
    pub async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        if instance_ids.is_empty() {
            return Ok(());
        }

        info!(count = instance_ids.len(), "Terminating instances in batch");

        self.client
            .terminate_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .context("Failed to terminate instances")?;

        Ok(())
    }
}
