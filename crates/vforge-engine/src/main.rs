//! Render queue engine binary.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vforge_engine::EngineConfig;
use vforge_queue::RenderQueue;
use vforge_render::HttpRenderBackend;
use vforge_store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();
    info!("Starting vforge-engine");

    let config = EngineConfig::from_env();
    info!("Engine config: {:?}", config);

    let backend = Arc::new(HttpRenderBackend::new(config.backend.clone())?);
    let store = Arc::new(JsonFileStore::new(&config.snapshot_path));
    let queue = Arc::new(RenderQueue::restore(backend, store, config.queue.clone()).await);

    let counts = queue.counts().await;
    info!(
        queued = counts.queued,
        processing = counts.processing,
        "Resuming render queue"
    );

    let cancel = CancellationToken::new();
    let runner = {
        let queue = queue.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { queue.run(cancel).await })
    };

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");
    cancel.cancel();
    runner.await.ok();

    let counts = queue.counts().await;
    info!(
        completed = counts.completed,
        failed = counts.failed,
        active = counts.active(),
        "Engine shutdown complete"
    );
    Ok(())
}

/// Initialize tracing with colored output for dev, JSON for production.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vforge=info".parse().expect("valid directive"))
        .add_directive("reqwest=warn".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
