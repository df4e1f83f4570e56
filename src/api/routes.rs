//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::generation::TaskGenerator;
use crate::llm::{LlmClient, OpenAiClient, RetryConfig};

use super::tasks;

/// Shared application state.
pub struct AppState {
    /// The task generation pipeline
    pub generator: TaskGenerator,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::with_config(
        config.api_key.clone(),
        config.completion_url.clone(),
        config.request_timeout,
        RetryConfig::default(),
    ));
    let generator = TaskGenerator::new(llm, config.model.clone());

    let state = Arc::new(AppState { generator });

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/tasks/generate", post(tasks::generate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
