use lazy_static::lazy_static;
use prometheus::exponential_buckets;
use prometheus::Encoder;
use prometheus::HistogramOpts;
use prometheus::HistogramVec;
use prometheus::IntCounterVec;
use prometheus::IntGaugeVec;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing::warn;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

#[cfg(test)]
mod metrics_test;

lazy_static! {
    pub static ref QUEUE_ADDS: IntCounterVec = IntCounterVec::new(
        Opts::new("ctrcfg_queue_adds_total", "Keys added to a work queue"),
        &["queue"]
    )
    .expect("metric can not be created");

    pub static ref QUEUE_RETRIES: IntCounterVec = IntCounterVec::new(
        Opts::new("ctrcfg_queue_retries_total", "Rate limited requeues"),
        &["queue"]
    )
    .expect("metric can not be created");

    pub static ref QUEUE_DEPTH: IntGaugeVec = IntGaugeVec::new(
        Opts::new("ctrcfg_queue_depth", "Keys waiting in a work queue"),
        &["queue"]
    )
    .expect("metric can not be created");

    pub static ref SYNC_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new("ctrcfg_sync_duration_seconds", "Duration of one sync handler run")
            .buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets")),
        &["queue"]
    )
    .expect("metric can not be created");

    pub static ref SYNC_RESULTS: IntCounterVec = IntCounterVec::new(
        Opts::new("ctrcfg_sync_results_total", "Sync handler outcomes"),
        &["queue", "result"]
    )
    .expect("metric can not be created");

    pub static ref ARTIFACT_WRITES: IntCounterVec = IntCounterVec::new(
        Opts::new("ctrcfg_artifact_writes_total", "Rendered artifacts created or updated"),
        &["source", "op"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

pub fn register_custom_metrics(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(QUEUE_ADDS.clone()))?;
    registry.register(Box::new(QUEUE_RETRIES.clone()))?;
    registry.register(Box::new(QUEUE_DEPTH.clone()))?;
    registry.register(Box::new(SYNC_DURATION_SECONDS.clone()))?;
    registry.register(Box::new(SYNC_RESULTS.clone()))?;
    registry.register(Box::new(ARTIFACT_WRITES.clone()))?;
    Ok(())
}

/// Serves `/metrics` until `shutdown_signal` fires
pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    if let Err(e) = register_custom_metrics(&REGISTRY) {
        warn!("could not register metrics: {}", e);
    }

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    let (addr, server) = warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
        let _ = shutdown_signal.changed().await;
    });
    info!(%addr, "metrics endpoint listening");
    server.await;
}

async fn metrics_handler() -> Result<impl Reply, Rejection> {
    Ok(gather_text(&REGISTRY))
}

/// Text exposition of `registry` followed by the process-wide default registry
pub fn gather_text(registry: &Registry) -> String {
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    }
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        error!("could not encode prometheus metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        error!("metrics could not be from_utf8'd: {}", e);
        String::default()
    })
}
