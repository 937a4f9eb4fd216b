//! HTTP client for the Housing Price API, used by `housing-cli` and any
//! other front end that talks to a running service.
//!
//! Every call carries its own timeout: status calls are short, predictions
//! get a little longer. There are no retries.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::prediction::handlers::{PredictResponse, SimplePredictResponse};
use crate::prediction::record::PropertyRecord;
use crate::routes::health::{HealthResponse, InfoResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);
const PREDICT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct HousingClient {
    client: Client,
    base_url: String,
}

impl HousingClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(self.client.get(self.url("/health")).timeout(STATUS_TIMEOUT))
            .await
    }

    /// GET /info
    pub async fn info(&self) -> Result<InfoResponse, ClientError> {
        self.send(self.client.get(self.url("/info")).timeout(STATUS_TIMEOUT))
            .await
    }

    /// POST /predict
    pub async fn predict(&self, record: &PropertyRecord) -> Result<PredictResponse, ClientError> {
        self.send(
            self.client
                .post(self.url("/predict"))
                .json(record)
                .timeout(PREDICT_TIMEOUT),
        )
        .await
    }

    /// POST /predict/simple
    pub async fn predict_simple(
        &self,
        record: &PropertyRecord,
    ) -> Result<SimplePredictResponse, ClientError> {
        self.send(
            self.client
                .post(self.url("/predict/simple"))
                .json(record)
                .timeout(PREDICT_TIMEOUT),
        )
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Service errors carry {"success": false, "error": "..."}
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("API call succeeded with status {status}");
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::artifacts::ModelArtifacts;
    use crate::prediction::record::LocationQuality;
    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::test_support::{self, DEFAULTS_PRICE};

    /// Serves `state` on an ephemeral loopback port and returns its base URL.
    async fn serve(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_health_and_info_round_trip() {
        let client = HousingClient::new(serve(test_support::state()).await).unwrap();

        let health = client.health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert!(health.model_loaded && health.scaler_loaded && health.encoders_loaded);

        let info = client.info().await.unwrap();
        assert_eq!(info.num_features, 12);
        assert_eq!(info.model_type, "LinearRegression");
    }

    #[tokio::test]
    async fn test_predict_simple_with_empty_record() {
        let client = HousingClient::new(serve(test_support::state()).await).unwrap();

        let response = client
            .predict_simple(&PropertyRecord::new())
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.predicted_price, DEFAULTS_PRICE);
        assert_eq!(response.input_summary.location_quality, LocationQuality::Standard);
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_message() {
        let client = HousingClient::new(serve(test_support::state()).await).unwrap();

        let record: PropertyRecord = serde_json::from_value(json!({"area": "huge"})).unwrap();
        let err = client.predict(&record).await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid numeric value for area");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unloaded_service_reports_server_error() {
        let state = AppState::new(Arc::new(ModelArtifacts::empty()));
        let client = HousingClient::new(serve(state).await).unwrap();

        let health = client.health().await.unwrap();
        assert!(!health.model_loaded);

        let err = client.info().await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, .. }));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = HousingClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.url("/health"), "http://localhost:5000/health");
    }
}
