//! Provisioning and teardown workflows
//!
//! Each workflow is a straight-line sequence of provider calls, generic over
//! [`Ec2Operations`](crate::aws::Ec2Operations) and
//! [`Route53Operations`](crate::aws::Route53Operations) so it can run against
//! a simulated cloud.
//!
//! - [`provision`]: image → security group → instances → running → addresses → DNS
//! - [`teardown`]: discover → terminate → terminated → security group → DNS
//! - [`discovery`]: tag-based lookup shared by teardown and `list`

pub mod access_group;
pub mod converge;
pub mod discovery;
mod error;
pub mod image;
pub mod naming;
pub mod progress;
pub mod provision;
pub mod teardown;

pub use access_group::GroupDeletion;
pub use converge::{AddressMap, ProvisionedInstance};
pub use discovery::CourseInstance;
pub use error::FleetError;
pub use naming::DeleteOutcome;
pub use progress::{ProgressEvent, ProgressReporter, StdoutReporter};
pub use provision::{ProvisionReport, Provisioner};
pub use teardown::{TeardownReport, Teardown};
