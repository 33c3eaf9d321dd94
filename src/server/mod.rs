pub mod api;
pub mod routes;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{AppConfig, ConfigError};

pub use api::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("server i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serve the API until the process is stopped. Reference data starts loading in the
/// background; endpoints report its progress through `/api/reference/status`.
pub async fn run_server(config: &AppConfig) -> Result<(), ServerError> {
    let state = AppState::from_config(config)?;

    let lifecycle = Arc::clone(&state.lifecycle);
    tokio::spawn(async move {
        if let Err(err) = lifecycle.initialize().await {
            warn!(error = %err, "initial reference data load failed; retry via /api/reference/initialize");
        }
    });

    let listener = TcpListener::bind(&config.bind).await?;
    info!("dpscalc server listening on http://{}", config.bind);
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
