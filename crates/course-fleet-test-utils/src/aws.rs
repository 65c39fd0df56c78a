//! AWS test utilities
//!
//! Provides region detection and unique course id generation for AWS integration tests.

use chrono::Utc;
use course_fleet_common::defaults::DEFAULT_REGION;

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-1
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| DEFAULT_REGION.to_string())
}

/// Generate a unique course id for test resources.
///
/// Format: `test-{timestamp_ms}-{counter}`, so security group names and
/// course tags never collide with a real course or a concurrent test.
pub fn test_course_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("test-{ts}-{counter}")
}
