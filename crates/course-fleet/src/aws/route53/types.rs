//! Route 53 types

use std::fmt;

/// Public hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Zone id without the `/hostedzone/` prefix
    pub id: String,
    /// Fully qualified zone name with trailing dot (e.g., "moraviancs.click.")
    pub name: String,
}

impl HostedZone {
    const ID_PREFIX: &'static str = "/hostedzone/";

    /// Build a zone from the provider's id, normalising the prefix away
    pub fn new(id: &str, name: impl Into<String>) -> Self {
        Self {
            id: id.strip_prefix(Self::ID_PREFIX).unwrap_or(id).to_string(),
            name: name.into(),
        }
    }
}

/// A resource record set as listed in a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Fully qualified record name with trailing dot
    pub name: String,
    /// Record type (e.g., "A", "NS", "SOA")
    pub record_type: String,
    pub ttl: Option<i64>,
    pub values: Vec<String>,
    /// Alias records carry no values and cannot be echoed back in a DELETE
    pub is_alias: bool,
}

impl RecordSet {
    /// A record pointing `name` at a single address
    pub fn a_record(name: impl Into<String>, address: impl fmt::Display, ttl: i64) -> Self {
        Self {
            name: name.into(),
            record_type: "A".to_string(),
            ttl: Some(ttl),
            values: vec![address.to_string()],
            is_alias: false,
        }
    }
}

/// Change action within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ChangeAction {
    Upsert,
    Delete,
}

/// One entry of an atomic change batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub record: RecordSet,
}

impl RecordChange {
    pub fn upsert(record: RecordSet) -> Self {
        Self {
            action: ChangeAction::Upsert,
            record,
        }
    }

    pub fn delete(record: RecordSet) -> Self {
        Self {
            action: ChangeAction::Delete,
            record,
        }
    }
}
