//! Student Performance Predictor - Inference Server
//!
//! Loads one pipeline artifact at startup and serves predictions from it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  PERF SERVER (Axum)                  │
//! ├──────────────────────────────────────────────────────┤
//! │  GET /          GET /health          POST /predict   │
//! │     │               │                     │          │
//! │     │               └──────────┬──────────┘          │
//! │     ▼                          ▼                     │
//! │  static form       Arc<dyn InferenceEngine>          │
//! │                    (preprocessor + forest)           │
//! └──────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod extract;
mod handlers;
mod models;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use perf_core::logic::features::LayoutInfo;
use perf_core::{load_artifact, InferenceEngine, Predictor};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "perf_server=debug,perf_core=info,tower_http=debug".into());
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Student Performance Server starting ({})...", config.environment);
    tracing::info!("Model: {}", config.model_path.display());

    // No model, no server
    let artifact = load_artifact(&config.model_path)
        .with_context(|| format!("failed to load model from {}", config.model_path.display()))?;
    let predictor = Predictor::from_artifact(artifact).context("artifact cannot be served")?;
    let layout = LayoutInfo::current();
    tracing::info!(
        "Feature layout v{} (hash {:08x}): {} numeric, {} categorical",
        layout.version,
        layout.hash,
        layout.numeric.len(),
        layout.categorical.len()
    );

    // Build application state
    let state = AppState {
        engine: Arc::new(predictor),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn InferenceEngine>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home::index))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
