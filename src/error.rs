use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Hyperliquid info operation a fetch failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Fills,
    Funding,
    AccountSnapshot,
}

impl FetchSource {
    /// Request `type` sent to the info endpoint
    pub fn request_type(&self) -> &'static str {
        match self {
            FetchSource::Fills => "userFillsByTime",
            FetchSource::Funding => "userFunding",
            FetchSource::AccountSnapshot => "clearinghouseState",
        }
    }
}

impl fmt::Display for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.request_type())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// No response was received
    Transport,
    /// Upstream answered with a non-success status
    Status(u16),
    /// Response body did not match the expected record shape
    Decode,
}

#[derive(Debug, thiserror::Error)]
#[error("{endpoint} fetch failed: {detail}")]
pub struct FetchError {
    pub endpoint: FetchSource,
    pub failure: FetchFailure,
    pub detail: String,
}

impl FetchError {
    pub fn transport(endpoint: FetchSource, err: impl fmt::Display) -> Self {
        Self {
            endpoint,
            failure: FetchFailure::Transport,
            detail: err.to_string(),
        }
    }

    pub fn status(endpoint: FetchSource, status: u16, body: impl fmt::Display) -> Self {
        Self {
            endpoint,
            failure: FetchFailure::Status(status),
            detail: format!("HTTP {}: {}", status, body),
        }
    }

    pub fn decode(endpoint: FetchSource, err: impl fmt::Display) -> Self {
        Self {
            endpoint,
            failure: FetchFailure::Decode,
            detail: err.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(#[from] FetchError),

    #[error("Malformed numeric field {field}: {value:?}")]
    MalformedNumber { field: &'static str, value: String },

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::UpstreamFetch(e) => {
                tracing::error!(endpoint = %e.endpoint, "Upstream fetch failed: {}", e.detail);
                match e.failure {
                    FetchFailure::Transport => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        format!("Hyperliquid API is not responding ({})", e.endpoint),
                    ),
                    _ => (StatusCode::BAD_GATEWAY, self.to_string()),
                }
            }
            AppError::MalformedNumber { .. } => {
                tracing::error!("{}", self);
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::ExternalApiError(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::RequestError(e) => {
                tracing::error!("Request error: {:?}", e);
                (StatusCode::BAD_GATEWAY, "External request failed".to_string())
            }
            AppError::Timeout(msg) => {
                tracing::error!("Timed out: {}", msg);
                (StatusCode::GATEWAY_TIMEOUT, msg.clone())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_map_to_service_unavailable() {
        let err = AppError::from(FetchError::transport(FetchSource::Funding, "connection refused"));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn status_failures_map_to_bad_gateway_and_name_the_source() {
        let err = AppError::from(FetchError::status(FetchSource::Fills, 500, "boom"));
        assert!(err.to_string().contains("userFillsByTime"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = AppError::ValidationError("Invalid address format".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
