use boomerang_core::{RegistryError, ShortenerError};
use std::future::Future;
use std::time::Duration;
use tracing::warn;
use typed_builder::TypedBuilder;

/// Bounded retry for transient registry failures.
///
/// Only errors for which [`RegistryError::is_transient`] holds are retried.
/// The delay starts at `backoff` and doubles after every failed attempt.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Values below 1 act as 1.
    #[builder(default = 3)]
    pub max_attempts: u32,
    #[builder(default = Duration::from_millis(10))]
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// Runs `op` until it succeeds, fails permanently or runs out of attempts.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        mut op: F,
    ) -> Result<T, ShortenerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RegistryError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delay = self.backoff;
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        error = %err,
                        "transient registry error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    return Err(ShortenerError::Unavailable {
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
