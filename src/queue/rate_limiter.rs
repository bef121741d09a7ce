use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::config::QueueConfig;

/// Decides how long a key waits before it is retried
pub trait RateLimiter: Send + Sync + 'static {
    /// Delay for the next retry of `key`; counts as one failure
    fn when(
        &self,
        key: &str,
    ) -> Duration;

    /// Clears the failure history of `key`
    fn forget(
        &self,
        key: &str,
    );

    /// Failures recorded for `key` since it was last forgotten
    fn num_requeues(
        &self,
        key: &str,
    ) -> u32;
}

/// Per-key `base * 2^failures`, capped at `max`
pub struct ItemExponentialRateLimiter {
    base: Duration,
    max: Duration,
    failures: Mutex<HashMap<String, u32>>,
}

impl ItemExponentialRateLimiter {
    pub fn new(
        base: Duration,
        max: Duration,
    ) -> Self {
        Self {
            base,
            max,
            failures: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for ItemExponentialRateLimiter {
    fn when(
        &self,
        key: &str,
    ) -> Duration {
        let mut failures = self.failures.lock();
        let count = failures.entry(key.to_string()).or_insert(0);
        let exp = *count;
        *count = count.saturating_add(1);

        1u32.checked_shl(exp)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.max, |d| d.min(self.max))
    }

    fn forget(
        &self,
        key: &str,
    ) {
        self.failures.lock().remove(key);
    }

    fn num_requeues(
        &self,
        key: &str,
    ) -> u32 {
        self.failures.lock().get(key).copied().unwrap_or(0)
    }
}

struct Bucket {
    tokens: f64,
    last: Instant,
}

/// Token bucket shared by every key: `qps` refill rate, `burst` capacity
///
/// Each call reserves one token; once the bucket is empty the returned delay
/// is the time until the reserved token becomes available.
pub struct BucketRateLimiter {
    qps: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
}

impl BucketRateLimiter {
    pub fn new(
        qps: f64,
        burst: u32,
    ) -> Self {
        Self {
            qps,
            burst: burst as f64,
            bucket: Mutex::new(Bucket {
                tokens: burst as f64,
                last: Instant::now(),
            }),
        }
    }
}

impl RateLimiter for BucketRateLimiter {
    fn when(
        &self,
        _key: &str,
    ) -> Duration {
        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        let refill = now.duration_since(bucket.last).as_secs_f64() * self.qps;
        bucket.tokens = (bucket.tokens + refill).min(self.burst);
        bucket.last = now;

        bucket.tokens -= 1.0;
        if bucket.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-bucket.tokens / self.qps)
        }
    }

    fn forget(
        &self,
        _key: &str,
    ) {
    }

    fn num_requeues(
        &self,
        _key: &str,
    ) -> u32 {
        0
    }
}

/// Combines limiters by taking the longest delay
pub struct MaxOfRateLimiter {
    limiters: Vec<Box<dyn RateLimiter>>,
}

impl MaxOfRateLimiter {
    pub fn new(limiters: Vec<Box<dyn RateLimiter>>) -> Self {
        Self { limiters }
    }
}

impl RateLimiter for MaxOfRateLimiter {
    fn when(
        &self,
        key: &str,
    ) -> Duration {
        self.limiters.iter().map(|l| l.when(key)).max().unwrap_or(Duration::ZERO)
    }

    fn forget(
        &self,
        key: &str,
    ) {
        for limiter in &self.limiters {
            limiter.forget(key);
        }
    }

    fn num_requeues(
        &self,
        key: &str,
    ) -> u32 {
        self.limiters.iter().map(|l| l.num_requeues(key)).max().unwrap_or(0)
    }
}

/// Per-key exponential backoff combined with an overall token bucket
pub fn default_controller_rate_limiter(config: &QueueConfig) -> MaxOfRateLimiter {
    MaxOfRateLimiter::new(vec![
        Box::new(ItemExponentialRateLimiter::new(config.base_delay(), config.max_delay())),
        Box::new(BucketRateLimiter::new(config.qps, config.burst)),
    ])
}
