//! Bounded exponential backoff for startup connections.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    /// Retries after the first attempt.
    pub retries: u32,
    pub factor: f64,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Backoff {
    pub const DATABASE: Backoff = Backoff {
        retries: 15,
        factor: 1.5,
        min_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(30),
    };

    pub const SEARCH_INDEX: Backoff = Backoff {
        retries: 15,
        factor: 3.5,
        min_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(30),
    };

    /// Delay before retry number `retry` (0-based), capped at `max_delay`.
    pub fn delay(&self, retry: u32) -> Duration {
        let exp = self.factor.powi(retry.min(i32::MAX as u32) as i32);
        let secs = self.min_delay.as_secs_f64() * exp;
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

/// Runs `op` until it succeeds or the retry budget is spent.
///
/// `op` receives the 1-based attempt number. The last error is returned when
/// every attempt failed.
pub async fn retry<T, E, F, Fut>(what: &str, backoff: Backoff, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut retry_no = 0;
    loop {
        let attempt = retry_no + 1;
        tracing::info!(target: "car_catalog::startup", %what, attempt, "connection attempt");
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if retry_no < backoff.retries => {
                let delay = backoff.delay(retry_no);
                tracing::warn!(
                    target: "car_catalog::startup",
                    %what,
                    attempt,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "connection attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retry_no += 1;
            }
            Err(e) => {
                tracing::error!(
                    target: "car_catalog::startup",
                    %what,
                    attempt,
                    error = %e,
                    "giving up after exhausting retries"
                );
                return Err(e);
            }
        }
    }
}
