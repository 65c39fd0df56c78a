//! Security group management

use super::Ec2Client;
use crate::aws::tags;
use anyhow::{Context, Result};
use aws_sdk_ec2::types::{IpPermission, IpRange, ResourceType};
use tracing::{debug, info};

impl Ec2Client {
    /// Create a course security group in the default VPC
    ///
    /// Not idempotent: a second group with the same name fails with
    /// `InvalidGroup.Duplicate`.
    pub async fn create_security_group(
        &self,
        name: &str,
        description: &str,
        course: &str,
    ) -> Result<String> {
        info!(name = %name, course = %course, "Creating security group");

        let response = self
            .client
            .create_security_group()
            .group_name(name)
            .description(description)
            .tag_specifications(tags::ec2_tag_spec(
                ResourceType::SecurityGroup,
                course,
                name,
            ))
            .send()
            .await
            .with_context(|| format!("Failed to create security group '{name}'"))?;

        let sg_id = response
            .group_id()
            .context("No security group ID in response")?
            .to_string();

        debug!(sg_id = %sg_id, "Created security group");

        Ok(sg_id)
    }

    /// Authorize inbound TCP on each port from `cidr` in a single call
    pub async fn authorize_ingress(
        &self,
        security_group_id: &str,
        ports: &[u16],
        cidr: &str,
    ) -> Result<()> {
        if ports.is_empty() {
            return Ok(());
        }

        info!(sg_id = %security_group_id, ?ports, cidr = %cidr, "Adding ingress rules");

        let permissions: Vec<IpPermission> = ports
            .iter()
            .map(|&port| {
                IpPermission::builder()
                    .ip_protocol("tcp")
                    .from_port(i32::from(port))
                    .to_port(i32::from(port))
                    .ip_ranges(IpRange::builder().cidr_ip(cidr).build())
                    .build()
            })
            .collect();

        self.client
            .authorize_security_group_ingress()
            .group_id(security_group_id)
            .set_ip_permissions(Some(permissions))
            .send()
            .await
            .context("Failed to add ingress rules to security group")?;

        Ok(())
    }

    /// Delete a security group by name
    ///
    /// A missing group surfaces as an `InvalidGroup.NotFound` error; callers
    /// decide whether that counts as success.
    pub async fn delete_security_group(&self, name: &str) -> Result<()> {
        info!(name = %name, "Deleting security group");

        self.client
            .delete_security_group()
            .group_name(name)
            .send()
            .await
            .with_context(|| format!("Failed to delete security group '{name}'"))?;

        debug!(name = %name, "Security group deleted");

        Ok(())
    }
}
