//! Progress reporting for the workflows
//!
//! Each step emits a [`ProgressEvent`]; its `Display` form is the exact line
//! (or lines) shown to the operator. Reporters decide where the text goes.

use crate::aws::PublicAddress;
use std::fmt;

/// One user-visible step of a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    // provisioning
    FetchingImage,
    ImageSelected { image_id: String },
    GroupCreated { group_id: String },
    Launching { name: String },
    Launched { name: String, instance_id: String },
    WaitingForRunning,
    InstancesRunning,
    AddressHeader,
    Address { name: String, address: PublicAddress },
    SkippingRecord { name: String },
    RecordsCreated { change_id: String },
    NoRecordsToCreate,

    // teardown
    NoInstancesFound { course: String },
    Terminating { count: usize },
    TerminatingInstance { instance_id: String, name: String },
    WaitingForTermination,
    DeletingGroup { name: String },
    GroupNotFound { name: String },
    ZoneNotFound { domain: String },
    DeletingRecord { label: String },
    RecordsDeleted,
    NoRecordsToDelete,
    TeardownComplete,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchingImage => f.write_str("Fetching the most recent Amazon Linux 2 AMI ID..."),
            Self::ImageSelected { image_id } => write!(f, "Using AMI ID: {image_id}"),
            Self::GroupCreated { group_id } => {
                write!(f, "Security group created with ID: {group_id}")
            }
            Self::Launching { name } => write!(f, "Creating EC2 instance for '{name}'..."),
            Self::Launched { name, instance_id } => {
                write!(f, "Instance '{name}' created with ID: {instance_id}")
            }
            Self::WaitingForRunning => f.write_str("Waiting for instances to be running..."),
            Self::InstancesRunning => f.write_str("Instances are running."),
            Self::AddressHeader => {
                f.write_str("\nStudent names and corresponding public IPv4 addresses:")
            }
            Self::Address { name, address } => write!(f, "{name}: {address}"),
            Self::SkippingRecord { name } => {
                write!(f, "Skipping DNS record for '{name}': no public address assigned.")
            }
            Self::RecordsCreated { change_id } => {
                write!(f, "DNS records created successfully. Change ID: {change_id}")
            }
            Self::NoRecordsToCreate => f.write_str("No DNS records to create."),
            Self::NoInstancesFound { course } => {
                write!(f, "No instances found with 'course' tag value '{course}'.")
            }
            Self::Terminating { count } => write!(f, "Terminating {count} instances:"),
            Self::TerminatingInstance { instance_id, name } => {
                write!(f, "  {instance_id}: {name}")
            }
            Self::WaitingForTermination => f.write_str("Waiting for instances to terminate..."),
            Self::DeletingGroup { name } => write!(f, "Deleting security group '{name}'..."),
            Self::GroupNotFound { name } => write!(f, "Security group '{name}' not found."),
            Self::ZoneNotFound { domain } => write!(f, "Hosted zone for '{domain}' not found."),
            Self::DeletingRecord { label } => write!(f, "Deleting DNS record for '{label}'..."),
            Self::RecordsDeleted => f.write_str("DNS records deleted."),
            Self::NoRecordsToDelete => f.write_str("No DNS records to delete."),
            Self::TeardownComplete => f.write_str("Course resources deleted successfully."),
        }
    }
}

/// Sink for workflow progress
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Prints the transcript on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl ProgressReporter for StdoutReporter {
    fn report(&self, event: ProgressEvent) {
        println!("{event}");
    }
}
