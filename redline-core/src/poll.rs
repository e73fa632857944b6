//! Bounded polling for readback confirmations
//!
//! Every confirmation in a review pass is an explicit poll for the expected
//! state change, never a fixed delay. The poll reports whether the probe
//! ever succeeded; mapping exhaustion to an error (and naming the stage that
//! timed out) is the caller's job.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::Result;

/// Poll `probe` every `interval` until it returns true or `timeout` elapses
///
/// The probe runs at least once even with a zero timeout. Probe errors
/// propagate immediately; they are surface failures, not timeouts.
pub async fn until<F, Fut>(interval: Duration, timeout: Duration, mut probe: F) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if probe().await? {
            return Ok(true);
        }

        if Instant::now() >= deadline {
            return Ok(false);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        sleep(interval.min(remaining)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_poll_succeeds_immediately() {
        let ok = until(Duration::from_millis(5), Duration::from_millis(50), || async {
            Ok(true)
        })
        .await
        .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_poll_succeeds_after_retries() {
        let calls = AtomicU32::new(0);
        let ok = until(Duration::from_millis(1), Duration::from_millis(200), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n >= 2) }
        })
        .await
        .unwrap();
        assert!(ok);
        assert!(calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_poll_times_out() {
        let ok = until(Duration::from_millis(1), Duration::from_millis(10), || async {
            Ok(false)
        })
        .await
        .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_poll_runs_probe_at_least_once() {
        let calls = AtomicU32::new(0);
        let ok = until(Duration::from_millis(1), Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(false) }
        })
        .await
        .unwrap();
        assert!(!ok);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_poll_propagates_probe_error() {
        let result = until(Duration::from_millis(1), Duration::from_millis(50), || async {
            Err(crate::Error::Driver("page gone".to_string()))
        })
        .await;
        assert!(result.is_err());
    }
}
