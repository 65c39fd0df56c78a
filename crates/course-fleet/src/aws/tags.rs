//! EC2 tag specifications for course resources
//!
//! Re-exports the tag schema from `course-fleet-common` and builds the SDK
//! `TagSpecification` values sent with create calls.

pub use course_fleet_common::tags::*;

/// Build an EC2 TagSpecification with the course membership tags and a created-at stamp.
pub fn ec2_tag_spec(
    resource_type: aws_sdk_ec2::types::ResourceType,
    course: &str,
    name: &str,
) -> aws_sdk_ec2::types::TagSpecification {
    use aws_sdk_ec2::types::{Tag, TagSpecification};

    let created_at = format_created_at(chrono::Utc::now());
    let mut builder = TagSpecification::builder().resource_type(resource_type);
    for (k, v) in course_tags(course, name) {
        builder = builder.tags(Tag::builder().key(k).value(v).build());
    }
    builder
        .tags(
            Tag::builder()
                .key(TAG_CREATED_AT)
                .value(created_at)
                .build(),
        )
        .build()
}
