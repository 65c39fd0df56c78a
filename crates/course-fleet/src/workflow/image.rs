//! Base image resolution

use super::FleetError;
use crate::aws::{Ec2Operations, ImageSummary};
use crate::config::ImageFilter;
use anyhow::Result;
use tracing::debug;

/// Pick the most recently created image from a query result
pub fn newest_image(images: &[ImageSummary]) -> Option<&ImageSummary> {
    // ISO 8601 timestamps order lexically; undated images sort first
    images.iter().max_by(|a, b| a.creation_date.cmp(&b.creation_date))
}

/// Resolve the newest image matching `filter`
pub async fn resolve_latest_image<E: Ec2Operations>(ec2: &E, filter: &ImageFilter) -> Result<String> {
    let images = ec2.describe_images(filter).await?;

    let newest = newest_image(&images).ok_or_else(|| FleetError::NoMatchingImage {
        pattern: filter.name_pattern.clone(),
    })?;

    debug!(
        image_id = %newest.image_id,
        creation_date = ?newest.creation_date,
        candidates = images.len(),
        "Selected base image"
    );

    Ok(newest.image_id.clone())
}
