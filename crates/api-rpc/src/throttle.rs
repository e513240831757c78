//! Dispatch throttle (token bucket)
//!
//! Every `action.dispatch.v1` call spawns a process, so presses are limited
//! to a burst plus a steady refill rate. Reads are not throttled.

use std::sync::Mutex;
use std::time::Instant;

pub const DEFAULT_BURST: u32 = 20;
pub const DEFAULT_RATE_PER_SEC: u32 = 10;

pub struct DispatchThrottle {
    bucket: Mutex<Bucket>,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl DispatchThrottle {
    /// Create a throttle
    ///
    /// # Arguments
    /// * `max_tokens` - Maximum burst size
    /// * `refill_rate` - Tokens added per second
    pub fn new(max_tokens: u32, refill_rate: u32) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: max_tokens as f64,
                last_refill: Instant::now(),
            }),
            max_tokens: max_tokens as f64,
            refill_rate: refill_rate as f64,
        }
    }

    /// Consume one token; `false` means the caller is throttled
    pub fn check(&self) -> bool {
        let mut bucket = match self.bucket.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

impl Default for DispatchThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_BURST, DEFAULT_RATE_PER_SEC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::{sleep, Duration};

    #[test]
    fn test_allows_burst_then_throttles() {
        let throttle = DispatchThrottle::new(5, 1);

        for _ in 0..5 {
            assert!(throttle.check());
        }
        assert!(!throttle.check());
    }

    #[tokio::test]
    async fn test_refills_over_time() {
        let throttle = DispatchThrottle::new(2, 20); // one token per 50ms

        assert!(throttle.check());
        assert!(throttle.check());
        assert!(!throttle.check());

        sleep(Duration::from_millis(150)).await;
        assert!(throttle.check());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_the_burst() {
        let throttle = Arc::new(DispatchThrottle::new(50, 1));

        let mut handles = vec![];
        for _ in 0..10 {
            let throttle = Arc::clone(&throttle);
            handles.push(tokio::spawn(async move {
                (0..10).filter(|_| throttle.check()).count()
            }));
        }

        let mut total_allowed = 0;
        for handle in handles {
            total_allowed += handle.await.unwrap();
        }

        // 100 attempts against a burst of 50 (plus at most a token of refill)
        assert!(
            (50..=51).contains(&total_allowed),
            "Expected about 50 allowed, got {}",
            total_allowed
        );
    }
}
