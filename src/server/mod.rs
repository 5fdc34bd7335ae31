pub mod handlers;
pub mod types;

use crate::Result;
use crate::config::Config;
use crate::model::ModelProvider;
use crate::pipeline::PredictionPipeline;
use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub fn router(state: handlers::AppState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/invocations", post(handlers::invocations))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let artifact_path =
        std::env::var("MODEL_PATH").unwrap_or_else(|_| config.model.artifact_path.clone());

    let provider = Arc::new(ModelProvider::from_path(&artifact_path));

    // Warm the model before accepting traffic. The invocation path retries
    // lazily, so an artifact that appears after startup still gets served.
    if let Err(e) = provider.ensure_loaded().await {
        warn!("Model not loaded at startup: {}", e);
    }

    let app_state = handlers::AppState {
        pipeline: Arc::new(PredictionPipeline::new(provider.clone())),
        provider,
    };

    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
