//! This server exposes the note API and the static frontend.
use std::sync::Arc;

use anyhow::Context;
use skribe::{config::Settings, router, state::AppState, store::NoteStore};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "server=debug,skribe=debug,tower_http=debug";

/// Sets up logging to stdout, or to a daily rolling file when a log
/// directory is configured. The returned guard must outlive the server.
fn init_tracing(settings: &Settings) -> WorkerGuard {
    let (writer, guard) = match &settings.log_dir {
        Some(dir) => tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "server.log")),
        None => tracing_appender::non_blocking(std::io::stdout()),
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(settings.log_dir.is_none())
        .with_writer(writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("failed to set global default");

    guard
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {:?}", err);
        std::future::pending::<()>().await;
    }

    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    let _guard = init_tracing(&settings);

    let store = NoteStore::open(&settings.database_path)
        .with_context(|| format!("failed to open database {:?}", settings.database_path))?;
    let state = Arc::new(AppState::new(store));
    let app = router::app(state, &settings.static_dir);
    let addr = settings.socket_addr().context("invalid listen address")?;

    info!("server is running on http://localhost:{}", settings.port);

    axum::Server::try_bind(&addr)
        .with_context(|| format!("failed to bind {addr}"))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
