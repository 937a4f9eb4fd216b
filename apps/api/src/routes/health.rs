use axum::{extract::State, Json};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub encoders_loaded: bool,
    pub feature_names_loaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub model_type: String,
    pub features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub num_features: usize,
    pub scaler_type: String,
}

/// GET /
/// Service banner listing the available endpoints.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Housing Price Prediction API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "active",
        "endpoints": {
            "/predict": "POST - Make price predictions",
            "/predict/simple": "POST - Prediction with defaults for missing fields",
            "/health": "GET - Check API health",
            "/info": "GET - Get model information"
        }
    }))
}

/// GET /health
/// Reports which artifacts are loaded. Always 200; `status` is `degraded`
/// when any component is missing.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let loaded = state.artifacts.status();
    let status = if loaded.all_loaded() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: Local::now().to_rfc3339(),
        model_loaded: loaded.model_loaded,
        scaler_loaded: loaded.scaler_loaded,
        encoders_loaded: loaded.encoders_loaded,
        feature_names_loaded: loaded.feature_names_loaded,
    })
}

/// GET /info
/// Describes the loaded model and its feature schema.
pub async fn info_handler(State(state): State<AppState>) -> Result<Json<InfoResponse>, AppError> {
    let predictor = state
        .artifacts
        .predictor()
        .ok_or(AppError::ComponentsNotLoaded)?;

    let features = predictor.feature_names().to_vec();
    Ok(Json(InfoResponse {
        model_type: predictor.model_type().to_string(),
        num_features: features.len(),
        features,
        categorical_features: predictor.categorical_features(),
        scaler_type: predictor.scaler_type().to_string(),
    }))
}
