use reqwest::StatusCode;
use std::thread;
use std::time::Duration;

/// How often and how patiently a failed request is repeated.
///
/// The sleep before retry `n` (1-based) is `backoff_factor * 2^(n - 1)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub retry_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            backoff_factor: Duration::from_millis(300),
            retry_statuses: vec![
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            backoff_factor: Duration::ZERO,
            retry_statuses: Vec::new(),
        }
    }

    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exponent = (retry - 1).min(16);
        self.backoff_factor * (1u32 << exponent)
    }

    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Calls `operation` with the 0-based attempt number until it succeeds,
    /// fails with an error `is_retryable` rejects, or retries run out.
    pub fn run<T, E, F, R>(&self, mut operation: F, is_retryable: R) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
        R: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match operation(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && is_retryable(&err) => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    tracing::debug!("Retry {}/{} in {:?}", attempt, self.max_retries, delay);
                    thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
