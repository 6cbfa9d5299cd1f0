use anyhow::Context;
use fb_server::{config, router, AppState, ServerConfig, SharedBackend};
use fb_store::FileBackend;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = config::command().get_matches();
    let config = config::from_matches(&matches)?;
    init_tracing(&config);

    let backend: SharedBackend = Arc::new(
        FileBackend::open(&config.data_file)
            .with_context(|| format!("opening {}", config.data_file.display()))?,
    );
    let state = AppState::new(backend, &config)?;
    let autosave = state.autosave().clone();

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, data = %config.data_file.display(), "form builder listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::error!(%error, "cannot listen for shutdown signal");
            }
        })
        .await
        .context("server error")?;

    let flushed = tokio::task::spawn_blocking(move || autosave.flush())
        .await
        .context("flushing pending edits")?;
    tracing::info!(flushed, "shutdown complete");
    Ok(())
}
