//! Keeping student DNS records in step with instance addresses

use crate::aws::tags::{leading_label, record_name, zone_name};
use crate::aws::{HostedZone, RecordChange, RecordSet, Route53Operations};
use anyhow::Result;
use course_fleet_common::RosterEntry;
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

/// What `delete_records` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// A DELETE batch was submitted for these records
    Deleted {
        change_id: String,
        records: Vec<RecordSet>,
    },
    /// Nothing in the zone matched; no request was sent
    NothingToDelete,
}

/// Find the public zone named exactly `<domain>.`
pub async fn resolve_zone<R: Route53Operations>(
    route53: &R,
    domain: &str,
) -> Result<Option<HostedZone>> {
    let wanted = zone_name(domain);
    let zones = route53.list_zones_by_name(domain).await?;

    let zone = zones.into_iter().find(|z| z.name == wanted);
    match &zone {
        Some(z) => debug!(zone_id = %z.id, domain, "Resolved hosted zone"),
        None => warn!(domain, "No hosted zone with an exact name match"),
    }

    Ok(zone)
}

/// Upsert one A record per mapping in a single batch.
///
/// Returns the change id, or `None` when there was nothing to send.
pub async fn upsert_records<R: Route53Operations>(
    route53: &R,
    zone: &HostedZone,
    domain: &str,
    mappings: &[(RosterEntry, Ipv4Addr)],
    ttl: i64,
) -> Result<Option<String>> {
    if mappings.is_empty() {
        return Ok(None);
    }

    let changes: Vec<RecordChange> = mappings
        .iter()
        .map(|(name, ip)| {
            RecordChange::upsert(RecordSet::a_record(
                record_name(name.as_str(), domain),
                ip,
                ttl,
            ))
        })
        .collect();

    let change_id = route53.change_records(&zone.id, changes).await?;
    info!(zone_id = %zone.id, count = mappings.len(), change_id = %change_id, "Upserted student records");

    Ok(Some(change_id))
}

/// Records in `records` whose leading label is one of `names`.
///
/// Names are compared as given, case-insensitively; empty names never match.
/// The zone apex never matches, and alias records are skipped because they
/// cannot be echoed back in a DELETE.
pub fn matching_records<S: AsRef<str>>(
    zone: &HostedZone,
    records: Vec<RecordSet>,
    names: &[S],
) -> Vec<RecordSet> {
    records
        .into_iter()
        .filter(|r| !r.name.eq_ignore_ascii_case(&zone.name))
        .filter(|r| {
            let label = leading_label(&r.name);
            names
                .iter()
                .map(|n| n.as_ref())
                .any(|n| !n.is_empty() && n.eq_ignore_ascii_case(label))
        })
        .filter(|r| {
            if r.is_alias {
                warn!(record = %r.name, record_type = %r.record_type, "Skipping alias record");
            }
            !r.is_alias
        })
        .collect()
}

/// Delete every record in the zone whose leading label is in `names`
pub async fn delete_records<R: Route53Operations, S: AsRef<str>>(
    route53: &R,
    zone: &HostedZone,
    names: &[S],
) -> Result<DeleteOutcome> {
    let records = route53.list_records(&zone.id).await?;
    let matched = matching_records(zone, records, names);

    if matched.is_empty() {
        debug!(zone_id = %zone.id, "No matching records to delete");
        return Ok(DeleteOutcome::NothingToDelete);
    }

    let changes = matched.iter().cloned().map(RecordChange::delete).collect();
    let change_id = route53.change_records(&zone.id, changes).await?;
    info!(zone_id = %zone.id, count = matched.len(), change_id = %change_id, "Deleted student records");

    Ok(DeleteOutcome::Deleted {
        change_id,
        records: matched,
    })
}
