//! Shared test utilities for course-fleet
//!
//! This crate provides common test helpers that can be used across
//! multiple test modules without circular dependencies.
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection and unique course id generation
//! - [`roster`]: Temporary roster files

pub mod aws;
pub mod roster;

// Re-export commonly used items
pub use aws::{get_test_region, test_course_id};
pub use roster::{SAMPLE_ROSTER, write_roster};
