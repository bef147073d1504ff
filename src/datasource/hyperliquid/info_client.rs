use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::types::{AccountSnapshot, Fill, FundingEvent};
use crate::datasource::pagination::{fetch_until_exhausted, Timestamped};
use crate::datasource::{DataSource, TimeWindow};
use crate::error::{FetchError, FetchSource};

/// Records the info endpoint returns per time-range request
pub const DEFAULT_PAGE_SIZE: usize = 2000;

#[derive(Clone)]
pub struct HyperliquidInfoClient {
    client: Client,
    base_url: String,
    page_size: usize,
}

impl HyperliquidInfoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: FetchSource,
        payload: Value,
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FetchError::transport(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FetchError::status(endpoint, status.as_u16(), error_text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::decode(endpoint, e))
    }

    /// Fetches every record of a time-range endpoint, page by page
    async fn fetch_paginated<T>(
        &self,
        endpoint: FetchSource,
        wallet: &str,
        window: TimeWindow,
    ) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned + Timestamped,
    {
        fetch_until_exhausted(window, self.page_size, move |cursor| {
            let payload = json!({
                "type": endpoint.request_type(),
                "user": wallet,
                "startTime": cursor,
                "endTime": window.end_ms
            });
            tracing::debug!(%endpoint, cursor, "Requesting page");

            async move {
                let page: Option<Vec<T>> = self.post(endpoint, payload).await?;
                Ok(page.unwrap_or_default())
            }
        })
        .await
    }
}

#[async_trait]
impl DataSource for HyperliquidInfoClient {
    async fn get_fills(&self, wallet: &str, window: TimeWindow) -> Result<Vec<Fill>, FetchError> {
        self.fetch_paginated(FetchSource::Fills, wallet, window).await
    }

    async fn get_funding(
        &self,
        wallet: &str,
        window: TimeWindow,
    ) -> Result<Vec<FundingEvent>, FetchError> {
        self.fetch_paginated(FetchSource::Funding, wallet, window).await
    }

    async fn get_account_snapshot(&self, wallet: &str) -> Result<AccountSnapshot, FetchError> {
        let payload = json!({
            "type": FetchSource::AccountSnapshot.request_type(),
            "user": wallet
        });
        self.post(FetchSource::AccountSnapshot, payload).await
    }
}
