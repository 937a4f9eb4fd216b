//! Axum route handlers for the Prediction API.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use bytes::Bytes;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::AppError;
use crate::prediction::record::{LocationQuality, PropertyRecord, SimpleProperty};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub predicted_price: f64,
    pub input_data: PropertyRecord,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSummary {
    pub area: f64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub location_quality: LocationQuality,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplePredictResponse {
    pub success: bool,
    pub predicted_price: f64,
    pub price_per_sqft: f64,
    pub input_summary: InputSummary,
    pub timestamp: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /predict
///
/// Full prediction. Numeric fields present in the body are coerced to floats;
/// anything the body lacks is filled during feature preparation.
pub async fn handle_predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    let predictor = state
        .artifacts
        .predictor()
        .ok_or(AppError::ComponentsNotLoaded)?;

    let mut record = parse_body(&headers, &body)?;
    info!(?record, "Received prediction request");

    record
        .coerce_numeric_fields()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let prediction = predictor.predict(&record)?;
    info!(prediction, "Prediction made");

    Ok(Json(PredictResponse {
        success: true,
        predicted_price: round2(prediction),
        input_data: record,
        timestamp: timestamp(),
    }))
}

/// POST /predict/simple
///
/// Prediction from a partial record. Absent fields take the documented
/// defaults, so an empty body is a valid request.
pub async fn handle_predict_simple(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SimplePredictResponse>, AppError> {
    let predictor = state
        .artifacts
        .predictor()
        .ok_or(AppError::ComponentsNotLoaded)?;

    let record = parse_body(&headers, &body)?;
    let property =
        SimpleProperty::from_record(&record).map_err(|e| AppError::Validation(e.to_string()))?;
    if property.area <= 0.0 {
        return Err(AppError::Validation(
            "area must be greater than zero".to_string(),
        ));
    }
    info!(?property, "Simple prediction request");

    let prediction = predictor.predict(&property.to_record())?;
    let price_per_sqft = price_per_sqft(prediction, property.area).ok_or_else(|| {
        AppError::Validation("area is too small to compute a price per square foot".to_string())
    })?;

    Ok(Json(SimplePredictResponse {
        success: true,
        predicted_price: round2(prediction),
        price_per_sqft,
        input_summary: InputSummary {
            area: property.area,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            location_quality: property.location_quality(),
        },
        timestamp: timestamp(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Reads the body as a form when the client says so, as JSON otherwise.
/// A blank body is an empty record.
fn parse_body(headers: &HeaderMap, body: &Bytes) -> Result<PropertyRecord, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PropertyRecord::new());
    }

    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| AppError::Validation(format!("Malformed form body: {e}")))?;
        let map: Map<String, Value> = pairs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        return Ok(PropertyRecord::from_map(map));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(PropertyRecord::from_map(map)),
        Ok(_) => Err(AppError::Validation(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(AppError::Validation(format!("Malformed JSON body: {e}"))),
    }
}

/// Rounded price per unit of area, or `None` when the ratio overflows.
fn price_per_sqft(price: f64, area: f64) -> Option<f64> {
    Some(round2(price / area)).filter(|v| v.is_finite())
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn timestamp() -> String {
    Local::now().to_rfc3339()
}
