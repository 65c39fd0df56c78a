//! Finding the instances that belong to a course

use crate::aws::tags::{TAG_COURSE, TAG_CREATED_AT, TAG_NAME};
use crate::aws::{Ec2Operations, InstanceSnapshot};
use anyhow::Result;
use course_fleet_common::{CourseId, InstanceState};
use serde::Serialize;
use tracing::debug;

/// A live instance tagged with the course
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseInstance {
    pub instance_id: String,
    /// Value of the `Name` tag (empty if missing)
    pub name: String,
    pub state: InstanceState,
    pub public_ip: Option<String>,
    pub created_at: Option<String>,
}

impl CourseInstance {
    fn from_snapshot(snapshot: InstanceSnapshot, state: InstanceState) -> Self {
        Self {
            name: snapshot.tag(TAG_NAME).unwrap_or_default().to_string(),
            created_at: snapshot.tag(TAG_CREATED_AT).map(str::to_string),
            instance_id: snapshot.instance_id,
            state,
            public_ip: snapshot.public_ip,
        }
    }
}

/// Live instances carrying `course=<course>`.
///
/// The provider query already filters by tag and state; the result is
/// checked again here so a loose server-side match cannot leak other courses.
pub async fn discover_course_instances<E: Ec2Operations>(
    ec2: &E,
    course: &CourseId,
) -> Result<Vec<CourseInstance>> {
    let snapshots = ec2.find_instances_by_tag(TAG_COURSE, course.as_str()).await?;
    let reported = snapshots.len();

    let instances: Vec<CourseInstance> = snapshots
        .into_iter()
        .filter(|s| s.tag(TAG_COURSE) == Some(course.as_str()))
        .filter_map(|s| match s.state {
            Some(state) if state.is_live() => Some(CourseInstance::from_snapshot(s, state)),
            _ => None,
        })
        .collect();

    debug!(course = %course, reported, kept = instances.len(), "Discovered course instances");

    Ok(instances)
}
