//! HTTP client for the risk scoring backend.
//!
//! Wraps the five JSON endpoints (prediction, student list, analytics,
//! dataset columns, health) using [`reqwest`]. No retries happen here;
//! every failure is normalized into a [`GatewayError`] and handed back.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{GatewayError, Operation};
use crate::models::{
    AnalyticsResponse, DatasetColumns, HealthStatus, PredictionResult, StudentInput,
    StudentsQuery, StudentsResponse,
};

/// Controllers depend on this rather than on [`ApiClient`] so they can be
/// driven by an in-memory backend in tests.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    async fn predict(&self, input: &StudentInput) -> Result<PredictionResult, GatewayError>;

    async fn list_students(&self, query: &StudentsQuery)
        -> Result<StudentsResponse, GatewayError>;

    async fn analytics(&self) -> Result<AnalyticsResponse, GatewayError>;

    async fn dataset_columns(&self) -> Result<DatasetColumns, GatewayError>;

    /// Never fails: an unreachable or broken backend reports as unavailable.
    async fn health(&self) -> HealthStatus;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, GatewayError> {
        tracing::debug!(path, ?query, "GET");
        let request = self.client.get(self.url(path)).query(query);
        Self::send(operation, request).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        operation: Operation,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        tracing::debug!(path, "POST");
        let request = self.client.post(self.url(path)).json(body);
        Self::send(operation, request).await
    }

    async fn send<T: DeserializeOwned>(
        operation: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request.send().await.map_err(|source| {
            tracing::warn!(?operation, error = %source, "request did not complete");
            GatewayError::Transport { operation, source }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| GatewayError::Transport { operation, source })?;

        if !status.is_success() {
            let err = GatewayError::from_error_body(operation, status.as_u16(), &body);
            tracing::warn!(?operation, status = status.as_u16(), message = %err, "backend reported failure");
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|source| {
            tracing::warn!(?operation, error = %source, "response did not match contract");
            GatewayError::Decode { operation, source }
        })
    }
}

#[async_trait::async_trait]
impl Gateway for ApiClient {
    async fn predict(&self, input: &StudentInput) -> Result<PredictionResult, GatewayError> {
        self.post_json(Operation::Predict, "/predict", input).await
    }

    async fn list_students(
        &self,
        query: &StudentsQuery,
    ) -> Result<StudentsResponse, GatewayError> {
        self.get_json(Operation::ListStudents, "/students", &query.to_pairs())
            .await
    }

    async fn analytics(&self) -> Result<AnalyticsResponse, GatewayError> {
        self.get_json(Operation::Analytics, "/analytics", &[]).await
    }

    async fn dataset_columns(&self) -> Result<DatasetColumns, GatewayError> {
        self.get_json(Operation::DatasetColumns, "/dataset/columns", &[])
            .await
    }

    async fn health(&self) -> HealthStatus {
        // The status code is ignored: the backend reports model failures
        // in the body.
        let response = match self.client.get(self.url("/health")).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "health check did not complete");
                return HealthStatus::unavailable(Operation::Health.fallback_message());
            }
        };

        match response.json::<HealthStatus>().await {
            Ok(health) => health,
            Err(err) => {
                tracing::debug!(error = %err, "health body unreadable");
                HealthStatus::unavailable(Operation::Health.fallback_message())
            }
        }
    }
}
