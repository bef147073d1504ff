use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::token_insights::TokenInsight;
use crate::validation;
use crate::AppState;

const DEFAULT_HISTORY_DAYS: u32 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct TokenInsightRequest {
    pub vs_currency: Option<String>,
    pub history_days: Option<u32>,
}

impl TokenInsightRequest {
    /// An empty body means all defaults
    fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| AppError::ValidationError(format!("Invalid request body: {}", e)))
    }
}

pub async fn post_token_insight(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<TokenInsight>> {
    let token_id = token_id.to_lowercase();
    if !validation::is_valid_token_id(&token_id) {
        return Err(AppError::ValidationError(format!("Invalid token id: {}", token_id)));
    }

    let request = TokenInsightRequest::from_body(&body)?;
    let vs_currency = request
        .vs_currency
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.trim().to_lowercase())
        .unwrap_or_else(|| "usd".to_string());
    let history_days = request
        .history_days
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_HISTORY_DAYS);

    let insight = state
        .token_insights
        .token_insight(&token_id, &vs_currency, history_days)
        .await?;

    Ok(Json(insight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::mock::MockDataSource;
    use crate::{build_router, test_state};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[test]
    fn empty_body_uses_defaults() {
        let request = TokenInsightRequest::from_body(b"  \n").unwrap();
        assert!(request.vs_currency.is_none());
        assert!(request.history_days.is_none());
    }

    #[test]
    fn body_fields_are_read() {
        let request =
            TokenInsightRequest::from_body(br#"{"vs_currency": "EUR", "history_days": 7}"#).unwrap();
        assert_eq!(request.vs_currency.as_deref(), Some("EUR"));
        assert_eq!(request.history_days, Some(7));
    }

    async fn post(uri: &str, body: &'static str) -> StatusCode {
        build_router(test_state(MockDataSource::new()))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        assert_eq!(post("/api/token/bitcoin/insight", "{not json").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_token_id_is_bad_request() {
        assert_eq!(post("/api/token/bit.coin/insight", "{}").await, StatusCode::BAD_REQUEST);
    }
}
