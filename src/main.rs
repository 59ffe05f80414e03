use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use todostore::{build_router, telemetry, AppState, Config, JsonFileStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init_logging(config.log_format);

    let store = JsonFileStore::open(&config.data_file)
        .await
        .with_context(|| format!("opening todo file at {}", config.data_file.display()))?;
    info!(path = %store.path().display(), "todo store ready");

    let app = build_router(AppState::new(Arc::new(store)));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "todostore listening");
    info!("GET    /api/todos       list todos");
    info!("POST   /api/todos       create a todo");
    info!("PUT    /api/todos/:id   set a todo's done flag");
    info!("DELETE /api/todos/:id   delete one todo");
    info!("DELETE /api/todos       clear completed todos");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("todostore stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
