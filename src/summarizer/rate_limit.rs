/*!
 * Shared gate in front of provider requests.
 *
 * A `RequestGate` caps the number of requests in flight with a semaphore
 * and, when the provider has a requests-per-minute limit, spaces requests
 * out with a token bucket. Batch runs share one gate between all videos.
 */

use log::debug;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::Instant;

use crate::errors::ProviderError;

/// Token bucket refilled continuously at `per_second` tokens per second
#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    per_second: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn per_minute(requests_per_minute: u32) -> Self {
        let capacity = f64::from(requests_per_minute.max(1));
        Self {
            capacity,
            tokens: capacity,
            per_second: capacity / 60.0,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.per_second).min(self.capacity);
        self.last_refill = now;
    }

    /// Take a token, or report how long to wait for the next one
    fn try_take(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / self.per_second))
        }
    }
}

/// Concurrency ceiling plus optional requests-per-minute limit
#[derive(Debug)]
pub struct RequestGate {
    semaphore: Semaphore,
    bucket: Option<Mutex<TokenBucket>>,
}

impl RequestGate {
    pub fn new(max_concurrent: usize, requests_per_minute: Option<u32>) -> Self {
        Self {
            semaphore: Semaphore::new(max_concurrent.max(1)),
            bucket: requests_per_minute.filter(|rpm| *rpm > 0).map(|rpm| Mutex::new(TokenBucket::per_minute(rpm))),
        }
    }

    /// A gate that only bounds concurrency
    pub fn unlimited(max_concurrent: usize) -> Self {
        Self::new(max_concurrent, None)
    }

    /// Currently free request slots
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot and, if rate limited, for a token.
    /// The slot is released when the returned permit is dropped.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, ProviderError> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ProviderError::RequestFailed("Request gate is closed".to_string()))?;

        if let Some(bucket) = &self.bucket {
            loop {
                let wait = bucket.lock().await.try_take(Instant::now());
                match wait {
                    Ok(()) => break,
                    Err(delay) => {
                        debug!("Rate limit reached, waiting {:?} for the next request slot", delay);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(permit)
    }
}
