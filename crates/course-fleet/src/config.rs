//! Configuration for the provisioning and teardown workflows

use crate::wait::WaitConfig;
use course_fleet_common::defaults::{self, image};
use std::time::Duration;

/// Filter used to pick the base machine image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFilter {
    pub owner: String,
    /// Image name glob (e.g., "amzn2-ami-hvm-*-x86_64-gp2")
    pub name_pattern: String,
    pub architecture: String,
    pub root_device_type: String,
    pub virtualization_type: String,
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self {
            owner: image::OWNER.to_string(),
            name_pattern: image::NAME_PATTERN.to_string(),
            architecture: image::ARCHITECTURE.to_string(),
            root_device_type: image::ROOT_DEVICE_TYPE.to_string(),
            virtualization_type: image::VIRTUALIZATION_TYPE.to_string(),
        }
    }
}

/// Deadlines and polling schedule for the two completion waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTimeouts {
    pub running: Duration,
    pub terminated: Duration,
    /// First delay between describe calls
    pub initial_poll: Duration,
    /// Cap on the delay between describe calls
    pub max_poll: Duration,
}

impl Default for WaitTimeouts {
    fn default() -> Self {
        let polling = WaitConfig::default();
        Self {
            running: Duration::from_secs(defaults::DEFAULT_RUNNING_TIMEOUT_SECS),
            terminated: Duration::from_secs(defaults::DEFAULT_TERMINATED_TIMEOUT_SECS),
            initial_poll: polling.initial_delay,
            max_poll: polling.max_delay,
        }
    }
}

impl WaitTimeouts {
    fn polling(&self, timeout: Duration) -> WaitConfig {
        WaitConfig {
            initial_delay: self.initial_poll,
            max_delay: self.max_poll,
            timeout,
            ..WaitConfig::default()
        }
    }

    /// Wait configuration for instances to reach `running`
    pub fn running_wait(&self) -> WaitConfig {
        self.polling(self.running)
    }

    /// Wait configuration for instances to reach `terminated`
    pub fn terminated_wait(&self) -> WaitConfig {
        self.polling(self.terminated)
    }
}

/// Everything a workflow needs besides the course and roster
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// AWS region
    pub region: String,
    /// AWS profile name (overrides default credential resolution)
    pub aws_profile: Option<String>,
    /// EC2 key pair attached to every instance
    pub key_pair: String,
    /// Parent domain of the student records (no trailing dot)
    pub domain: String,
    /// EC2 instance type
    pub instance_size: String,
    /// Inbound TCP ports opened on the course security group
    pub allowed_ports: Vec<u16>,
    /// Source range for the ingress rules
    pub ingress_cidr: String,
    /// TTL of the student A records, in seconds
    pub record_ttl: i64,
    pub image: ImageFilter,
    pub wait: WaitTimeouts,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            region: defaults::DEFAULT_REGION.to_string(),
            aws_profile: None,
            key_pair: defaults::DEFAULT_KEY_PAIR.to_string(),
            domain: defaults::DEFAULT_DOMAIN.to_string(),
            instance_size: defaults::DEFAULT_INSTANCE_TYPE.to_string(),
            allowed_ports: defaults::DEFAULT_ALLOWED_PORTS.to_vec(),
            ingress_cidr: defaults::DEFAULT_INGRESS_CIDR.to_string(),
            record_ttl: defaults::DEFAULT_RECORD_TTL,
            image: ImageFilter::default(),
            wait: WaitTimeouts::default(),
        }
    }
}
