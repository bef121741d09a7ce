use std::time::Duration;

use super::*;
use crate::config::QueueConfig;

#[test]
fn test_item_exponential_doubles_per_failure() {
    let limiter = ItemExponentialRateLimiter::new(Duration::from_millis(5), Duration::from_secs(1000));

    assert_eq!(limiter.when("a"), Duration::from_millis(5));
    assert_eq!(limiter.when("a"), Duration::from_millis(10));
    assert_eq!(limiter.when("a"), Duration::from_millis(20));
    assert_eq!(limiter.when("b"), Duration::from_millis(5));
    assert_eq!(limiter.num_requeues("a"), 3);

    limiter.forget("a");
    assert_eq!(limiter.num_requeues("a"), 0);
    assert_eq!(limiter.when("a"), Duration::from_millis(5));
}

#[test]
fn test_item_exponential_is_capped() {
    let limiter = ItemExponentialRateLimiter::new(Duration::from_millis(5), Duration::from_secs(1000));
    let mut last = Duration::ZERO;
    for _ in 0..40 {
        last = limiter.when("a");
    }
    assert_eq!(last, Duration::from_secs(1000));
}

#[tokio::test(start_paused = true)]
async fn test_bucket_allows_burst_then_spaces_requests() {
    let limiter = BucketRateLimiter::new(10.0, 2);

    assert_eq!(limiter.when("a"), Duration::ZERO);
    assert_eq!(limiter.when("b"), Duration::ZERO);
    assert_eq!(limiter.when("c"), Duration::from_millis(100));
    assert_eq!(limiter.when("d"), Duration::from_millis(200));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(limiter.when("e"), Duration::ZERO);
    assert_eq!(limiter.num_requeues("a"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_default_limiter_takes_the_longest_delay() {
    let limiter = default_controller_rate_limiter(&QueueConfig::default());

    assert_eq!(limiter.when("a"), Duration::from_millis(5));
    assert_eq!(limiter.when("a"), Duration::from_millis(10));
    assert_eq!(limiter.num_requeues("a"), 2);

    limiter.forget("a");
    assert_eq!(limiter.num_requeues("a"), 0);
}
