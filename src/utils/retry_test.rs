use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::config::BackoffPolicy;
use crate::Error;
use crate::StoreError;

fn policy(max_retries: usize) -> BackoffPolicy {
    BackoffPolicy {
        max_retries,
        base_delay_ms: 10,
        max_delay_ms: 40,
        jitter: 0.0,
    }
}

fn conflict() -> Error {
    StoreError::Conflict {
        kind: "RenderedArtifact",
        name: "99-worker-R".to_string(),
    }
    .into()
}

#[tokio::test(start_paused = true)]
async fn test_retry_on_conflict_succeeds_after_conflicts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();

    let result = retry_on_conflict(&policy(5), || {
        let c = c.clone();
        async move {
            if c.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(conflict())
            } else {
                Ok(42)
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_on_conflict_gives_up_after_max_attempts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();

    let result: crate::Result<()> = retry_on_conflict(&policy(3), || {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Err(conflict())
        }
    })
    .await;

    assert!(result.unwrap_err().is_conflict());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_other_errors_are_not_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();

    let result: crate::Result<()> = retry_on_conflict(&policy(5), || {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Transport("connection reset".to_string()).into())
        }
    })
    .await;

    assert!(matches!(result, Err(Error::Store(StoreError::Transport(_)))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_backoff_delay_is_capped_and_jittered() {
    let p = policy(5);
    assert_eq!(backoff_delay(&p, 0), Duration::from_millis(10));
    assert_eq!(backoff_delay(&p, 1), Duration::from_millis(20));
    assert_eq!(backoff_delay(&p, 5), Duration::from_millis(40));
    assert_eq!(backoff_delay(&p, 64), Duration::from_millis(40));

    let jittered = BackoffPolicy { jitter: 1.0, ..p };
    for _ in 0..20 {
        let d = backoff_delay(&jittered, 0);
        assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(20));
    }
}
