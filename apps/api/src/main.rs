use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use housing_api::artifacts::ModelArtifacts;
use housing_api::config::Config;
use housing_api::routes::build_router;
use housing_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Housing Price API v{}", env!("CARGO_PKG_VERSION"));

    // Load model components; missing artifacts stop startup unless degraded
    // start is enabled
    let artifacts = load_artifacts(&config)?
        .with_unknown_category_policy(config.unknown_category_policy());
    let status = artifacts.status();
    if status.all_loaded() {
        info!("All model components loaded");
    } else {
        warn!(?status, "Serving with missing model components");
    }

    let state = AppState::new(Arc::new(artifacts));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST and PORT must form a valid socket address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_artifacts(config: &Config) -> Result<ModelArtifacts> {
    let paths = config.artifact_paths();

    if !config.allow_degraded_start {
        return ModelArtifacts::load(&paths).context("Failed to load model components");
    }

    let (artifacts, failures) =
        ModelArtifacts::load_partial(&paths).context("Loaded model components disagree")?;
    for failure in &failures {
        warn!("Model component unavailable: {failure}");
    }
    Ok(artifacts)
}
