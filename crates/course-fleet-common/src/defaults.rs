//! Default configuration values
//!
//! These are the values used when neither a CLI flag nor an environment
//! variable overrides them.

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default EC2 key pair attached to every student instance
pub const DEFAULT_KEY_PAIR: &str = "coleman-moravian";

/// Default Route 53 domain the student records live under
pub const DEFAULT_DOMAIN: &str = "moraviancs.click";

/// Default EC2 instance size
pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";

/// Inbound TCP ports opened to the world (SSH, HTTP, HTTPS)
pub const DEFAULT_ALLOWED_PORTS: [u16; 3] = [22, 80, 443];

/// Source CIDR for the ingress rules
pub const DEFAULT_INGRESS_CIDR: &str = "0.0.0.0/0";

/// TTL in seconds for student A records
pub const DEFAULT_RECORD_TTL: i64 = 300;

/// Default deadline for instances to reach `running` (10 minutes)
pub const DEFAULT_RUNNING_TIMEOUT_SECS: u64 = 600;

/// Default deadline for instances to reach `terminated` (10 minutes)
pub const DEFAULT_TERMINATED_TIMEOUT_SECS: u64 = 600;

/// Amazon Linux 2 base image filter
pub mod image {
    /// Image owner alias
    pub const OWNER: &str = "amazon";
    /// Image name pattern
    pub const NAME_PATTERN: &str = "amzn2-ami-hvm-*-x86_64-gp2";
    /// CPU architecture
    pub const ARCHITECTURE: &str = "x86_64";
    /// Root device type
    pub const ROOT_DEVICE_TYPE: &str = "ebs";
    /// Virtualization type
    pub const VIRTUALIZATION_TYPE: &str = "hvm";
}
