mod cluster;
mod config;
mod copy;
mod export;
mod extract;
mod keywords;
mod lemma;
mod models;
mod ocr;
mod pipeline;
mod routes;
mod score;
mod text;

use axum::{Router, extract::DefaultBodyLimit, routing::{get, post}};
use routes::{export_csv, generate, generate_with_thumbnail, get_options, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use std::sync::Arc;
use tower_http::cors::{CorsLayer, Any};

use crate::config::AppConfig;
use crate::ocr::recognizer_from_config;

fn app(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/options", get(get_options))
        .route("/api/generate", post(generate))
        .route("/api/generate/upload", post(generate_with_thumbnail))
        .route("/api/export", post(export_csv))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env();
    tracing::info!(
        "Using OCR engine {:?} with API key: {}...",
        config.ocr_engine,
        config.gemini_api_key.chars().take(4).collect::<String>()
    );

    let state = AppState { recognizer: Arc::from(recognizer_from_config(&config)) };
    let app = app(state, config.max_upload_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
