use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::debug;
use tracing::warn;

use crate::config::BackoffPolicy;
use crate::Result;

/// Runs `op` until it stops failing with a conflict
///
/// Any other error is returned at once. After `policy.max_retries` attempts the
/// last conflict is returned.
pub async fn retry_on_conflict<F, Fut, T>(
    policy: &BackoffPolicy,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if e.is_conflict() => {
                attempt += 1;
                if attempt >= policy.max_retries {
                    warn!(attempts = attempt, "conflict retries exhausted: {}", e);
                    return Err(e);
                }
                let delay = backoff_delay(policy, attempt - 1);
                debug!(attempt, ?delay, "conflict, retrying: {}", e);
                sleep(delay).await;
            }
            other => return other,
        }
    }
}

/// `base * 2^step` capped at `max`, plus up to `jitter * delay` extra
pub(crate) fn backoff_delay(
    policy: &BackoffPolicy,
    step: usize,
) -> Duration {
    let base = policy.base_delay();
    let exp = base
        .checked_mul(1u32.checked_shl(step as u32).unwrap_or(u32::MAX))
        .unwrap_or(policy.max_delay());
    let delay = exp.min(policy.max_delay());
    if policy.jitter <= 0.0 || delay.is_zero() {
        return delay;
    }
    let extra = rand::thread_rng().gen_range(0.0..=policy.jitter);
    delay + delay.mul_f64(extra)
}

// Spawns a named task that logs its failure instead of propagating it
pub(crate) fn spawn_task<F, Fut>(
    name: &str,
    task_fn: F,
    handles: Option<&mut Vec<tokio::task::JoinHandle<()>>>,
) where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let name = name.to_string();
    let handle = tokio::spawn(async move {
        if let Err(e) = task_fn().await {
            tracing::error!("spawned task: {name} stopped or encountered an error: {:?}", e);
        }
    });

    if let Some(h) = handles {
        h.push(handle);
    }
}
