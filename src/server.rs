use std::sync::Arc;

use axum::Router;
use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::AppState;
use crate::api;
use crate::config::AppConfig;

/// Build the application router with all routes and layers applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::sessions::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve the signing key, falling back to a random per-process key.
pub fn signing_key(config: &AppConfig) -> anyhow::Result<Key> {
    if let Some(key) = config.session.signing_key()? {
        return Ok(key);
    }
    warn!(
        name: "session.key.ephemeral",
        "No session secret configured; using a random key. Sessions will not survive a restart."
    );
    Ok(Key::generate())
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let key = signing_key(&config)?;
    let state = AppState::new(Arc::clone(&config), key);

    let sweeper = state
        .sessions
        .spawn_sweeper(config.session.sweep_interval());

    info!(
        shape = config.route.shape.as_str(),
        increment = config.route.increments(),
        idle_timeout_secs = config.session.idle_timeout_secs,
        "Session route configured"
    );

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
}
