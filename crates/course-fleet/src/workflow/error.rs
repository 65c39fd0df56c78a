//! Workflow error types

use course_fleet_common::InstanceState;
use thiserror::Error;

/// Failures the workflows report as values rather than provider errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FleetError {
    /// No image matched the base image filter
    #[error("No image matches '{pattern}'")]
    NoMatchingImage { pattern: String },

    /// The public hosted zone for the domain does not exist
    #[error("Hosted zone for '{domain}' not found")]
    ZoneNotFound { domain: String },

    /// An instance left the boot path while waiting for it to run
    #[error("Instance {instance_id} entered state {state} while waiting for running ({reason})")]
    InstanceFailed {
        instance_id: String,
        state: InstanceState,
        reason: String,
    },

    /// The configured instance type is not one EC2 knows
    #[error("Invalid instance type: {0}")]
    InvalidInstanceType(String),
}

impl FleetError {
    /// Find a fleet error anywhere in an error chain
    pub fn find(error: &anyhow::Error) -> Option<&FleetError> {
        error.chain().find_map(|cause| cause.downcast_ref::<FleetError>())
    }
}
