//! EC2 instance management

mod instance;
mod operations;
mod security_group;
mod types;

pub use operations::Ec2Operations;
pub use types::{
    ImageSummary, InstanceSnapshot, LaunchInstanceConfig, LaunchedInstance, PublicAddress,
};

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::config::ImageFilter;
use anyhow::{Context, Result};
use aws_sdk_ec2::{Client, types::Filter};
use tracing::debug;

/// EC2 client for managing course instances
pub struct Ec2Client {
    pub(crate) client: Client,
}

impl FromAwsContext for Ec2Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
        }
    }
}

impl Ec2Client {
    /// Create a new EC2 client (loads AWS config from environment)
    pub async fn new(region: &str) -> Result<Self> {
        let ctx = AwsContext::new(region).await;
        Ok(Self::from_context(&ctx))
    }

    /// List the images matching the configured base image filter
    pub async fn describe_images(&self, filter: &ImageFilter) -> Result<Vec<ImageSummary>> {
        let response = self
            .client
            .describe_images()
            .owners(&filter.owner)
            .filters(
                Filter::builder()
                    .name("name")
                    .values(&filter.name_pattern)
                    .build(),
            )
            .filters(
                Filter::builder()
                    .name("architecture")
                    .values(&filter.architecture)
                    .build(),
            )
            .filters(
                Filter::builder()
                    .name("root-device-type")
                    .values(&filter.root_device_type)
                    .build(),
            )
            .filters(
                Filter::builder()
                    .name("virtualization-type")
                    .values(&filter.virtualization_type)
                    .build(),
            )
            .send()
            .await
            .context("Failed to describe images")?;

        let images: Vec<ImageSummary> = response
            .images()
            .iter()
            .filter_map(|img| {
                Some(ImageSummary {
                    image_id: img.image_id()?.to_string(),
                    creation_date: img.creation_date().map(str::to_string),
                })
            })
            .collect();

        debug!(count = images.len(), pattern = %filter.name_pattern, "Described images");

        Ok(images)
    }
}
