//! EC2 types and configuration

use course_fleet_common::InstanceState;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// Image returned by an image query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub image_id: String,
    /// ISO 8601 creation timestamp as reported by EC2
    pub creation_date: Option<String>,
}

/// Launched instance info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedInstance {
    pub instance_id: String,
}

/// Configuration for launching one student instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchInstanceConfig {
    /// Course identifier (value of the `course` tag)
    pub course: String,
    /// Roster entry (value of the `Name` tag)
    pub name: String,
    /// Base image to boot
    pub image_id: String,
    /// EC2 instance type (e.g., "t2.micro")
    pub instance_type: String,
    /// EC2 key pair name
    pub key_name: String,
    /// Security group the instance joins
    pub security_group_id: String,
}

impl LaunchInstanceConfig {
    /// Create a launch configuration; every field is explicit
    pub fn new(
        course: impl Into<String>,
        name: impl Into<String>,
        image_id: impl Into<String>,
        instance_type: impl Into<String>,
        key_name: impl Into<String>,
        security_group_id: impl Into<String>,
    ) -> Self {
        Self {
            course: course.into(),
            name: name.into(),
            image_id: image_id.into(),
            instance_type: instance_type.into(),
            key_name: key_name.into(),
            security_group_id: security_group_id.into(),
        }
    }
}

/// Point-in-time view of an instance from a describe call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSnapshot {
    pub instance_id: String,
    /// None when EC2 reports a state this crate does not know
    pub state: Option<InstanceState>,
    /// Provider explanation for the last state transition, if any
    pub state_reason: Option<String>,
    pub public_ip: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl InstanceSnapshot {
    /// Value of a tag on this instance
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Public IPv4 address of an instance, or the explicit absence of one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicAddress {
    Assigned(Ipv4Addr),
    Unassigned,
}

impl PublicAddress {
    /// Text printed for instances without an address
    pub const UNASSIGNED: &'static str = "unassigned";

    /// Interpret the address field of a describe response
    pub fn from_reported(reported: Option<&str>) -> Self {
        reported
            .and_then(|ip| ip.parse().ok())
            .map_or(Self::Unassigned, Self::Assigned)
    }

    pub fn assigned(self) -> Option<Ipv4Addr> {
        match self {
            Self::Assigned(ip) => Some(ip),
            Self::Unassigned => None,
        }
    }
}

impl fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned(ip) => write!(f, "{ip}"),
            Self::Unassigned => f.write_str(Self::UNASSIGNED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_address_from_reported() {
        assert_eq!(
            PublicAddress::from_reported(Some("54.12.0.7")),
            PublicAddress::Assigned(Ipv4Addr::new(54, 12, 0, 7))
        );
        assert_eq!(PublicAddress::from_reported(None), PublicAddress::Unassigned);
        assert_eq!(
            PublicAddress::from_reported(Some("not-an-ip")),
            PublicAddress::Unassigned
        );
    }

    #[test]
    fn test_public_address_display() {
        assert_eq!(PublicAddress::Unassigned.to_string(), "unassigned");
        assert_eq!(
            PublicAddress::Assigned(Ipv4Addr::new(1, 2, 3, 4)).to_string(),
            "1.2.3.4"
        );
        assert_eq!(PublicAddress::Unassigned.assigned(), None);
    }

    #[test]
    fn test_launch_config_fields() {
        let config =
            LaunchInstanceConfig::new("devops", "caine", "ami-1", "t3.small", "grader", "sg-1");
        assert_eq!(config.instance_type, "t3.small");
        assert_eq!(config.key_name, "grader");
        assert_eq!(config.name, "caine");
    }
}
