//! EC2 instance lifecycle states
//!
//! Mirrors the provider's `instance-state-name` values so discovery filters
//! and waiters agree on which states count as "still belongs to the course".

/// Instance lifecycle state, serialized with the provider's spelling.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
}

impl InstanceState {
    /// States an instance can be in and still be reclaimed by teardown.
    pub const LIVE: [InstanceState; 4] = [
        InstanceState::Pending,
        InstanceState::Running,
        InstanceState::ShuttingDown,
        InstanceState::Stopping,
    ];

    /// Whether teardown should still consider this instance.
    pub fn is_live(self) -> bool {
        Self::LIVE.contains(&self)
    }

    /// Whether an instance in this state can no longer reach `running`
    /// without outside intervention.
    pub fn is_failed_boot(self) -> bool {
        matches!(
            self,
            Self::ShuttingDown | Self::Terminated | Self::Stopping | Self::Stopped
        )
    }

    /// Parse from the provider's spelling, returning None for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}
