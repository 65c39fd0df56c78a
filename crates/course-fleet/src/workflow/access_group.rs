//! Per-course security group

use crate::aws::{Ec2Operations, classify_anyhow_error};
use crate::aws::tags::security_group_name;
use crate::config::FleetConfig;
use anyhow::Result;
use course_fleet_common::CourseId;
use tracing::{info, instrument};

/// Result of deleting a security group by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDeletion {
    Deleted,
    NotFound,
}

/// Create the course security group and open the configured ports
#[instrument(skip_all, fields(course = %course))]
pub async fn create_access_group<E: Ec2Operations>(
    ec2: &E,
    course: &CourseId,
    config: &FleetConfig,
) -> Result<String> {
    let name = security_group_name(course.as_str());
    let description = format!("Security group for {course} instances");

    let group_id = ec2
        .create_security_group(&name, &description, course.as_str())
        .await?;
    ec2.authorize_ingress(&group_id, &config.allowed_ports, &config.ingress_cidr)
        .await?;

    info!(group_id = %group_id, ports = ?config.allowed_ports, "Security group ready");

    Ok(group_id)
}

/// Delete a security group by name; a missing group is not an error
pub async fn delete_access_group<E: Ec2Operations>(ec2: &E, name: &str) -> Result<GroupDeletion> {
    match ec2.delete_security_group(name).await {
        Ok(()) => Ok(GroupDeletion::Deleted),
        Err(e) if classify_anyhow_error(&e).is_not_found() => {
            info!(name = %name, "Security group already absent");
            Ok(GroupDeletion::NotFound)
        }
        Err(e) => Err(e),
    }
}
