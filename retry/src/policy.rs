use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::backoff::Backoff;

/// Blocking sleep used between attempts.
pub type Sleep = Arc<dyn Fn(Duration) + Send + Sync>;

/// Default attempt ceiling: one initial call plus two retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Bounded retry around a single remote call.
///
/// Only errors accepted by the caller's predicate are retried. Once the
/// attempts run out, the error from the final attempt is returned exactly as
/// the operation produced it.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    sleep: Sleep,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy {
    /// A policy with the default backoff. Zero attempts is treated as one.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::default(),
            sleep: Arc::new(std::thread::sleep),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replace the blocking sleep, e.g. to record delays in tests.
    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Arc::new(sleep);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Run `op`, blocking the current thread during backoff.
    pub fn run<T, E, F, P>(&self, mut op: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: Fn(&E) -> bool,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let delay = self.next_delay(attempt, &err, &is_retryable).ok_or(err)?;
            (self.sleep)(delay);
            attempt += 1;
        }
    }

    /// Run the future produced by `op`, sleeping on the tokio timer during
    /// backoff so the scheduler thread is never blocked.
    pub async fn run_async<T, E, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let delay = self.next_delay(attempt, &err, &is_retryable).ok_or(err)?;
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Wait before the next attempt, or `None` when `err` must be surfaced.
    fn next_delay<E, P>(&self, attempt: u32, err: &E, is_retryable: &P) -> Option<Duration>
    where
        P: Fn(&E) -> bool,
        E: fmt::Display,
    {
        if !is_retryable(err) {
            return None;
        }
        if attempt >= self.max_attempts {
            warn!(attempts = attempt, error = %err, "retry: attempts exhausted");
            return None;
        }
        let delay = self.backoff.delay(attempt);
        warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retry: transient failure, backing off"
        );
        Some(delay)
    }
}
