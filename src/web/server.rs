use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::types::Config;

use super::api::{generate, health_check, AppState};

/// Start the remote-trigger server. `POST /api/generate` runs the
/// orchestrator in-process and replies when the run completes.
pub async fn run_server(
    config: Arc<Config>,
    listen: &str,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app_state = Arc::new(AppState {
        config,
        shutdown_rx: shutdown_rx.clone(),
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/generate", post(generate))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("Trigger server listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|&v| v).await;
            tracing::info!("Trigger server shutting down gracefully");
        })
        .await?;

    Ok(())
}
