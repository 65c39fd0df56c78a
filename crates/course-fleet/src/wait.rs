//! Resource waiting with exponential backoff, a deadline and cancellation.
//!
//! Provides a generic abstraction for waiting on AWS resources (or any async condition)
//! to reach a target state, with configurable exponential backoff and jitter.
//! Deadline expiry and cancellation surface as a typed [`WaitError`] inside the
//! returned `anyhow::Error`, so callers can tell them apart from provider failures.

use anyhow::Result;
use backon::{BackoffBuilder, ExponentialBuilder};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for resource waiting with exponential backoff.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Initial delay between checks
    pub initial_delay: Duration,
    /// Maximum delay between checks (cap for exponential growth)
    pub max_delay: Duration,
    /// Maximum total time to wait before timeout
    pub timeout: Duration,
    /// Randomise delays so concurrent waiters spread out
    pub jitter: bool,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(15),
            timeout: Duration::from_secs(600),
            jitter: true,
        }
    }
}

/// Why a wait ended without the resource becoming ready
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WaitError {
    #[error("Timeout waiting for {resource} after {timeout:?} ({attempts} attempts)")]
    Timeout {
        resource: String,
        timeout: Duration,
        attempts: u32,
    },

    #[error("Wait for {resource} cancelled")]
    Cancelled { resource: String },
}

impl WaitError {
    /// Find a wait error anywhere in an error chain
    pub fn find(error: &anyhow::Error) -> Option<&WaitError> {
        error.chain().find_map(|cause| cause.downcast_ref::<WaitError>())
    }
}

/// Wait for a resource to become ready with exponential backoff.
///
/// Uses `backon::ExponentialBuilder` for delay calculation and `tokio::select!`
/// for cancellation support. Sleeps never overshoot the deadline.
///
/// # Arguments
/// * `config` - Wait configuration
/// * `cancel` - Optional cancellation token
/// * `check` - Async function that returns `Ok(true)` when ready, `Ok(false)` to retry
/// * `resource_name` - Name for logging and errors
///
/// # Returns
/// * `Ok(())` - Resource is ready
/// * `Err` - [`WaitError`] on timeout or cancellation, otherwise the check's error
///
/// # Example
/// ```ignore
/// wait_for_resource(
///     WaitConfig::default(),
///     Some(&cancel_token),
///     || async {
///         let ready = check_if_resource_exists().await;
///         Ok(ready)
///     },
///     "my-resource",
/// ).await?;
/// ```
pub async fn wait_for_resource<F, Fut>(
    config: WaitConfig,
    cancel: Option<&CancellationToken>,
    check: F,
    resource_name: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    let cancelled = || WaitError::Cancelled {
        resource: resource_name.to_string(),
    };

    let mut backoff = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .without_max_times();
    if config.jitter {
        backoff = backoff.with_jitter();
    }

    let mut delays = backoff.build();

    loop {
        attempts += 1;

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(cancelled().into());
        }

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            return Err(WaitError::Timeout {
                resource: resource_name.to_string(),
                timeout: config.timeout,
                attempts: attempts - 1,
            }
            .into());
        }

        match check().await {
            Ok(true) => {
                debug!(resource = %resource_name, attempts, "Resource ready");
                return Ok(());
            }
            Ok(false) => {
                let remaining = config.timeout.saturating_sub(start.elapsed());
                let delay = delays
                    .next()
                    .unwrap_or(config.max_delay)
                    .min(remaining);
                debug!(
                    resource = %resource_name,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Resource not ready, retrying"
                );

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = async {
                        match cancel {
                            Some(token) => token.cancelled().await,
                            None => std::future::pending::<()>().await,
                        }
                    } => {
                        return Err(cancelled().into());
                    }
                }
            }
            Err(e) => {
                warn!(resource = %resource_name, error = ?e, "Resource check failed");
                return Err(e);
            }
        }
    }
}
