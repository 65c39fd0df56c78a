//! Rendering of the `list` command

use crate::aws::tags::parse_created_at;
use crate::workflow::CourseInstance;
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

fn created_cell(created_at: Option<&str>) -> String {
    created_at
        .and_then(parse_created_at)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Table of a course's live instances, one row per instance
pub fn instance_table(instances: &[CourseInstance]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Instance ID"),
            Cell::new("Name"),
            Cell::new("State"),
            Cell::new("Public IP"),
            Cell::new("Created"),
        ]);

    for instance in instances {
        table.add_row(vec![
            Cell::new(&instance.instance_id),
            Cell::new(&instance.name),
            Cell::new(instance.state),
            Cell::new(instance.public_ip.as_deref().unwrap_or("-")),
            Cell::new(created_cell(instance.created_at.as_deref())),
        ]);
    }

    table
}
