//! AWS resource tag schema for course-fleet
//!
//! Teardown has no local record of what provisioning created. It finds
//! everything again through the tags and names defined here, so this module
//! is the single place the schema lives.
//!
//! ## Tag Schema
//!
//! | Tag Key | Resource | Description |
//! |---------|----------|-------------|
//! | `course` | instance, security group | Course identifier (membership key) |
//! | `Name` | instance | Roster entry, also the DNS label |
//! | `Name` | security group | `<course>_security_group` |
//! | `course-fleet:created-at` | instance, security group | RFC 3339 creation timestamp |
//!
//! An instance belongs to course `C` iff it carries `course=C` and is in a
//! live state (see [`crate::InstanceState::is_live`]). The created-at tag is
//! informational and never used for membership.

/// Tag key binding a resource to its course
pub const TAG_COURSE: &str = "course";

/// Tag key holding the roster entry (instances) or group name (security groups)
pub const TAG_NAME: &str = "Name";

/// Tag key for creation timestamp (RFC 3339 format)
pub const TAG_CREATED_AT: &str = "course-fleet:created-at";

/// Suffix appended to the course id to name its security group
pub const SECURITY_GROUP_SUFFIX: &str = "_security_group";

/// Name of the security group owned by a course.
pub fn security_group_name(course: &str) -> String {
    format!("{course}{SECURITY_GROUP_SUFFIX}")
}

/// Fully qualified record name for a roster entry, without the trailing dot.
pub fn record_name(entry: &str, domain: &str) -> String {
    format!("{}.{}", entry, domain.trim_end_matches('.'))
}

/// Hosted zone name for a domain as the naming provider reports it (trailing dot).
pub fn zone_name(domain: &str) -> String {
    format!("{}.", domain.trim_end_matches('.'))
}

/// Leading label of a DNS name (`coleman.example.com.` -> `coleman`).
pub fn leading_label(name: &str) -> &str {
    name.split('.').next().unwrap_or_default()
}

/// Membership tags for a course resource, in the order they are sent.
///
/// Instances carry the roster entry as `Name`, the security group its own name.
pub fn course_tags<'a>(course: &'a str, name: &'a str) -> [(&'static str, &'a str); 2] {
    [(TAG_NAME, name), (TAG_COURSE, course)]
}

/// Helper to format creation timestamp for tags
pub fn format_created_at(time: chrono::DateTime<chrono::Utc>) -> String {
    time.to_rfc3339()
}

/// Helper to parse creation timestamp from tags
pub fn parse_created_at(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}
