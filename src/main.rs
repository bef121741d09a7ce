use std::fs;
use std::sync::Arc;

use ctrcfg::config::ControllerSettings;
use ctrcfg::config::LoggingConfig;
use ctrcfg::controller::Controller;
use ctrcfg::controller::Feeds;
use ctrcfg::events::TracingEventRecorder;
use ctrcfg::metrics;
use ctrcfg::render::StaticBundleRenderer;
use ctrcfg::store::ClusterManifest;
use ctrcfg::store::MemoryStore;
use ctrcfg::Error;
use ctrcfg::Result;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let settings = ControllerSettings::new()?.validate()?;

    // Initializing Logs
    let _guard = init_observability(&settings.logging)?;
    info!(?settings, "settings loaded");

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    // Local mode: the in-memory store stands in for the cluster
    let store = Arc::new(match &settings.local.manifest {
        Some(path) => MemoryStore::from_manifest(ClusterManifest::load(path)?),
        None => MemoryStore::new(),
    });
    let feeds = Feeds::from_memory_store(&store);

    if settings.monitoring.prometheus_enabled {
        let port = settings.monitoring.prometheus_port;
        let rx = graceful_rx.clone();
        tokio::spawn(async move { metrics::start_server(port, rx).await });
    }

    let renderer = Arc::new(StaticBundleRenderer::new(
        settings.controller.templates_dir.clone(),
        settings.controller.fallback_role.clone(),
    ));
    let controller = Controller::new(store, renderer, Arc::new(TracingEventRecorder), &settings);

    info!("Controller started. Waiting for SIGINT/SIGTERM...");
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    if let Err(e) = controller.run(feeds, graceful_rx).await {
        error!("controller stops: {:?}", e);
    }

    info!("Exiting program.");
    Ok(())
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    let mut sigint =
        signal(SignalKind::interrupt()).map_err(|e| Error::Fatal(format!("could not install SIGINT handler: {e}")))?;
    let mut sigterm =
        signal(SignalKind::terminate()).map_err(|e| Error::Fatal(format!("could not install SIGTERM handler: {e}")))?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    graceful_tx
        .send(())
        .map_err(|e| Error::Fatal(format!("Failed to send shutdown signal: {e}")))?;

    info!("Shutdown signal sent");
    Ok(())
}

/// Installs the global subscriber; keep the guard alive to flush file logs
pub fn init_observability(logging: &LoggingConfig) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| Error::InvalidConfig(format!("logging.level: {e}")))?;

    let (non_blocking, guard) = match &logging.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .map_err(|e| Error::Fatal(format!("could not create log dir {}: {e}", dir.display())))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, "ctrcfg.log"))
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
    let layer = if logging.json {
        fmt_layer.json().boxed()
    } else {
        fmt_layer.boxed()
    };
    tracing_subscriber::registry().with(layer.with_filter(filter)).init();

    Ok(guard)
}
