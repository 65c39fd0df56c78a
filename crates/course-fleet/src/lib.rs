//! course-fleet - per-student EC2 instances and DNS records for a course
//!
//! This crate provides the `course-fleet` binary that provisions one EC2
//! instance and one Route 53 A record per roster entry, and reclaims them by
//! course tag.

pub mod aws;
pub mod config;
pub mod listing;
pub mod wait;
pub mod workflow;
