pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::prediction::handlers;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/info", get(health::info_handler))
        // Prediction API
        .route("/predict", post(handlers::handle_predict))
        .route("/predict/simple", post(handlers::handle_predict_simple))
        .fallback(not_found)
        .with_state(state)
}
