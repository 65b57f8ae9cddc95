// src/error.rs
//! Error types for every layer of the gateway and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure talking to an external provider (generation or OCR).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    #[error("Provider job failed: {0}")]
    JobFailed(String),
    #[error("Job {request_id} is still {status}")]
    Pending { request_id: String, status: String },
}

/// Failure of a pipeline run. A stage failure aborts the whole pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{provider_id}' failed: {reason}")]
    StageFailure { provider_id: String, reason: String },
    #[error("Pipeline '{0}' has no stages")]
    EmptyPipeline(String),
}

impl PipelineError {
    pub fn stage(provider_id: &str, reason: impl Into<String>) -> Self {
        PipelineError::StageFailure {
            provider_id: provider_id.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Errors surfaced at the HTTP boundary. Every variant renders as `{ "error": ... }`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Method not allowed.")]
    MethodNotAllowed,
    #[error("Server misconfigured: {0}")]
    ServerMisconfigured(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Failed to process image: {0}")]
    Provider(#[from] ProviderError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::ServerMisconfigured(_)
            | ApiError::Pipeline(_)
            | ApiError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Misconfiguration detail stays in the logs.
    fn client_message(&self) -> String {
        match self {
            ApiError::ServerMisconfigured(_) => {
                "Provider credentials are not configured on the server.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::ServerMisconfigured(detail) => {
                tracing::error!("❌ Server misconfigured: {}", detail);
            }
            ApiError::Pipeline(e) => tracing::error!("❌ Pipeline failed: {}", e),
            ApiError::Provider(e) => tracing::error!("❌ Provider call failed: {}", e),
            ApiError::InvalidInput(msg) => tracing::debug!("Rejected request: {}", msg),
            ApiError::MethodNotAllowed => {}
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}
