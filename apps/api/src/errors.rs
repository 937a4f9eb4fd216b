use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::prediction::features::FeatureError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Endpoint not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Model components not loaded")]
    ComponentsNotLoaded,

    #[error("{0}")]
    Prediction(#[from] FeatureError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ComponentsNotLoaded => {
                tracing::error!("Request rejected: model components not loaded");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Prediction(e) => {
                tracing::error!("Prediction error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
