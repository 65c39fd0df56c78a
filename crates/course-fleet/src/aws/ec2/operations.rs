//! EC2 operations trait for testing

use super::Ec2Client;
use super::types::{ImageSummary, InstanceSnapshot, LaunchInstanceConfig, LaunchedInstance};
use crate::config::ImageFilter;
use anyhow::Result;
use std::future::Future;

/// Trait for EC2 operations that can be simulated in tests.
///
/// This trait abstracts the compute provider so the provisioning and
/// teardown workflows can run against an in-memory cloud.
pub trait Ec2Operations: Send + Sync {
    /// List images matching the filter
    fn describe_images(
        &self,
        filter: &ImageFilter,
    ) -> impl Future<Output = Result<Vec<ImageSummary>>> + Send;

    /// Create a security group tagged with the course, returning its ID
    fn create_security_group(
        &self,
        name: &str,
        description: &str,
        course: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Allow inbound TCP on each port from `cidr`
    fn authorize_ingress(
        &self,
        security_group_id: &str,
        ports: &[u16],
        cidr: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a security group by name
    fn delete_security_group(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Launch a single instance
    fn launch_instance(
        &self,
        config: LaunchInstanceConfig,
    ) -> impl Future<Output = Result<LaunchedInstance>> + Send;

    /// Describe specific instances
    fn describe_instances(
        &self,
        instance_ids: &[String],
    ) -> impl Future<Output = Result<Vec<InstanceSnapshot>>> + Send;

    /// Find live instances carrying `key=value`
    fn find_instances_by_tag(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<InstanceSnapshot>>> + Send;

    /// Terminate instances in a single call
    fn terminate_instances(
        &self,
        instance_ids: &[String],
    ) -> impl Future<Output = Result<()>> + Send;
}

impl Ec2Operations for Ec2Client {
    async fn describe_images(&self, filter: &ImageFilter) -> Result<Vec<ImageSummary>> {
        Ec2Client::describe_images(self, filter).await
    }

    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
        course: &str,
    ) -> Result<String> {
        Ec2Client::create_security_group(self, name, description, course).await
    }

    async fn authorize_ingress(
        &self,
        security_group_id: &str,
        ports: &[u16],
        cidr: &str,
    ) -> Result<()> {
        Ec2Client::authorize_ingress(self, security_group_id, ports, cidr).await
    }

    async fn delete_security_group(&self, name: &str) -> Result<()> {
        Ec2Client::delete_security_group(self, name).await
    }

    async fn launch_instance(&self, config: LaunchInstanceConfig) -> Result<LaunchedInstance> {
        Ec2Client::launch_instance(self, config).await
    }

    async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<InstanceSnapshot>> {
        Ec2Client::describe_instances(self, instance_ids).await
    }

    async fn find_instances_by_tag(&self, key: &str, value: &str) -> Result<Vec<InstanceSnapshot>> {
        Ec2Client::find_instances_by_tag(self, key, value).await
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        Ec2Client::terminate_instances(self, instance_ids).await
    }
}
