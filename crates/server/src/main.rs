//! Update gateway server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use updates_core::config::{AppConfig, EventDispatch, LogFormat};
use updates_events::{
    EventSink, EventSources, EventWorkerHandle, EventWriter, QueuedEventSink, StoreEventSink,
};
use updates_server::{AppState, create_router};
use updates_storage::{ObjectStoreDescriptorStore, VersionDescriptorStore};

/// updatesd - release update gateway
#[derive(Parser, Debug)]
#[command(name = "updatesd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "UPDATES_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, has_config_file) = load_config(&args.config)?;
    init_tracing(config.server.log_format);

    tracing::info!(
        service = %config.server.service_name,
        revision = %config.server.service_version,
        "updatesd v{}",
        env!("CARGO_PKG_VERSION")
    );
    if has_config_file {
        tracing::info!(config_path = %args.config, "Loaded configuration from file");
    } else {
        tracing::info!(
            config_path = %args.config,
            "No config file found, using defaults and environment variables"
        );
    }

    updates_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    // Descriptor store
    let descriptor_backend = updates_storage::from_config(&config.descriptor.storage)
        .await
        .context("failed to initialize descriptor storage")?;
    descriptor_backend
        .health_check()
        .await
        .context("descriptor storage health check failed")?;
    tracing::info!(
        backend = descriptor_backend.backend_name(),
        key = %config.descriptor.key,
        "Descriptor storage initialized"
    );
    let descriptors: Arc<dyn VersionDescriptorStore> = Arc::new(ObjectStoreDescriptorStore::new(
        descriptor_backend,
        config.descriptor.key.clone(),
    ));

    // Event sink
    let event_backend = updates_storage::from_config(&config.events.storage)
        .await
        .context("failed to initialize event storage")?;
    event_backend
        .health_check()
        .await
        .context("event storage health check failed")?;
    tracing::info!(
        backend = event_backend.backend_name(),
        dispatch = ?config.events.dispatch,
        "Event storage initialized"
    );

    let writer = EventWriter::new(event_backend);
    let (events, worker): (Arc<dyn EventSink>, Option<EventWorkerHandle>) =
        match config.events.dispatch {
            EventDispatch::Inline => (
                Arc::new(StoreEventSink::new(writer, EventSources::system())),
                None,
            ),
            EventDispatch::Background => {
                let (sink, handle) = QueuedEventSink::spawn(
                    writer,
                    EventSources::system(),
                    config.events.queue_capacity,
                );
                (Arc::new(sink), Some(handle))
            }
        };

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    let app = create_router(AppState::new(config, descriptors, events));

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(worker) = worker {
        worker.shutdown().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Load configuration from the optional TOML file and the environment.
///
/// Later sources win: file, then the Knative service variables
/// (`K_SERVICE`, `K_REVISION`), then `UPDATES_*`. `PORT` replaces the bind
/// address last. Returns whether the file existed.
fn load_config(path: &str) -> Result<(AppConfig, bool)> {
    let mut figment = Figment::new();
    let has_config_file = std::path::Path::new(path).exists();
    if has_config_file {
        figment = figment.merge(Toml::file(path));
    }

    let mut config: AppConfig = figment
        .merge(
            Env::raw()
                .only(&["K_SERVICE"])
                .map(|_| "server.service_name".into()),
        )
        .merge(
            Env::raw()
                .only(&["K_REVISION"])
                .map(|_| "server.service_version".into()),
        )
        .merge(Env::prefixed("UPDATES_").ignore(&["CONFIG"]).split("__"))
        .extract()
        .context("failed to load configuration")?;

    if let Ok(port) = std::env::var("PORT") {
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid PORT value: {port:?}"))?;
        config.server.listen_on_port(port);
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    Ok((config, has_config_file))
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
