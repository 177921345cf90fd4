//! Readiness polling.
//!
//! A bounded wait: probe, sleep, probe again, up to a fixed number of
//! attempts. There is no sleep after the last attempt.

use pressdock_types::config::ReadinessConfig;
use pressdock_types::{PressdockError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Attempt limits for a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Probes before giving up
    pub max_attempts: u32,
    /// Fixed delay between probes
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a new policy.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Longest time a wait under this policy can spend sleeping.
    pub fn max_wait(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&ReadinessConfig::default())
    }
}

impl From<&ReadinessConfig> for RetryPolicy {
    fn from(config: &ReadinessConfig) -> Self {
        Self::new(config.max_attempts, config.delay())
    }
}

/// Probe `target` until it answers or the policy is exhausted.
///
/// `probe` receives the 1-based attempt number. `Ok(false)` means "not yet";
/// an `Err` from the probe aborts the wait immediately. Returns the attempt
/// that succeeded.
pub async fn wait_until_ready<F, Fut>(target: &str, policy: RetryPolicy, mut probe: F) -> Result<u32>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for attempt in 1..=policy.max_attempts {
        if probe(attempt).await? {
            info!("{} ready after {} attempt(s)", target, attempt);
            return Ok(attempt);
        }

        debug!("{} not ready (attempt {}/{})", target, attempt, policy.max_attempts);
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(PressdockError::ReadinessTimeout {
        target: target.to_string(),
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_exhaustion_probes_exactly_max_attempts() {
        let calls = AtomicU32::new(0);
        let err = wait_until_ready("database", instant(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(false) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            PressdockError::ReadinessTimeout { target, attempts } => {
                assert_eq!(target, "database");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let calls = AtomicU32::new(0);
        let attempt = wait_until_ready("database", instant(10), |n| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n == 4) }
        })
        .await
        .unwrap();

        assert_eq!(attempt, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_probe_error_aborts_wait() {
        let calls = AtomicU32::new(0);
        let err = wait_until_ready("database", instant(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(PressdockError::MissingDependency("docker".to_string())) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, PressdockError::MissingDependency(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sleep_after_last_attempt() {
        let started = tokio::time::Instant::now();
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        let _ = wait_until_ready("database", policy, |_| async { Ok(false) }).await;

        assert_eq!(started.elapsed(), Duration::from_secs(4));
        assert_eq!(policy.max_wait(), Duration::from_secs(4));
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&ReadinessConfig { max_attempts: 60, delay_secs: 1 });
        assert_eq!(policy, RetryPolicy::new(60, Duration::from_secs(1)));
        assert_eq!(RetryPolicy::default().max_attempts, 30);
    }
}
