//! course-fleet-common - Shared types and utilities
//!
//! This crate provides the types shared by the course-fleet workflows and
//! their tests, without any AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values
//! - [`instance_state`]: EC2 instance lifecycle states
//! - [`roster`]: Course roster loading and validation
//! - [`tags`]: Tag schema binding AWS resources to a course

pub mod defaults;
pub mod instance_state;
pub mod roster;
pub mod tags;

// Re-export commonly used types
pub use instance_state::InstanceState;
pub use roster::{CourseId, Roster, RosterEntry, RosterError};
