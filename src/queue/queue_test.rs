use std::sync::Arc;
use std::time::Duration;

use super::*;

fn queue() -> Arc<WorkQueue> {
    WorkQueue::new(
        "test",
        Box::new(ItemExponentialRateLimiter::new(
            Duration::from_millis(5),
            Duration::from_secs(1000),
        )),
    )
}

#[tokio::test]
async fn test_adds_are_deduplicated() {
    let q = queue();
    q.add("a");
    q.add("a");
    q.add("b");
    assert_eq!(q.len(), 2);

    assert_eq!(q.get().await.as_deref(), Some("a"));
    assert_eq!(q.get().await.as_deref(), Some("b"));
    assert!(q.is_empty());
}

#[tokio::test]
async fn test_key_added_while_processing_is_requeued_on_done() {
    let q = queue();
    q.add("a");
    let key = q.get().await.unwrap();

    q.add("a");
    assert!(q.is_empty(), "in-flight key must not be handed out twice");

    q.done(&key);
    assert_eq!(q.len(), 1);
    assert_eq!(q.get().await.as_deref(), Some("a"));
    q.done("a");
    assert!(q.is_empty());
}

#[tokio::test]
async fn test_get_waits_for_add() {
    let q = queue();
    let waiter = {
        let q = q.clone();
        tokio::spawn(async move { q.get().await })
    };
    tokio::task::yield_now().await;

    q.add("late");
    assert_eq!(waiter.await.unwrap().as_deref(), Some("late"));
}

#[tokio::test]
async fn test_shutdown_releases_waiters_and_ignores_adds() {
    let q = queue();
    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let q = q.clone();
            tokio::spawn(async move { q.get().await })
        })
        .collect();
    tokio::task::yield_now().await;

    q.shut_down();
    for w in waiters {
        assert_eq!(w.await.unwrap(), None);
    }

    q.add("ignored");
    assert!(q.is_empty());
    assert_eq!(q.get().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_add_after_delays_the_key() {
    let q = queue();
    q.add_after("a", Duration::from_secs(60));
    tokio::task::yield_now().await;
    assert!(q.is_empty());

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(q.is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(q.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_add_rate_limited_counts_requeues() {
    let q = queue();
    q.add_rate_limited("a");
    q.add_rate_limited("a");
    assert_eq!(q.num_requeues("a"), 2);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(q.len(), 1);

    q.forget("a");
    assert_eq!(q.num_requeues("a"), 0);
}
