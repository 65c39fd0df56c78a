//! AWS client modules
//!
//! This module provides wrappers around AWS SDK clients for:
//! - EC2: Images, security groups and instances
//! - Route 53: Hosted zone lookup and record changes
//!
//! Each client has an `*Operations` trait so workflows can run against a
//! simulated provider in tests.

pub mod context;
pub mod ec2;
pub mod error;
pub mod route53;
pub mod tags;

pub use context::{AwsContext, FromAwsContext};
pub use ec2::{
    Ec2Client, Ec2Operations, ImageSummary, InstanceSnapshot, LaunchInstanceConfig,
    LaunchedInstance, PublicAddress,
};
pub use route53::{
    ChangeAction, HostedZone, RecordChange, RecordSet, Route53Client, Route53Operations,
};

// Error handling
pub use error::{AwsError, classify_anyhow_error, classify_aws_error};
