use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinMetadata {
    pub id: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub market_data: Option<CoinMarketData>,
}

/// Per-currency market figures; CoinGecko sends `null` for some currencies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub market_cap: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub total_volume: HashMap<String, Option<f64>>,
    pub price_change_percentage_24h: Option<f64>,
}

/// `[timestamp_ms, value]` series
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}

#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.api_key {
            Some(key) => request.header("x-cg-demo-api-key", key),
            None => request,
        }
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Url> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| AppError::ExternalApiError(format!("Invalid CoinGecko URL: {}", e)))
    }

    /// Fetches token metadata including current market figures
    pub async fn get_coin(&self, token_id: &str) -> AppResult<CoinMetadata> {
        let url = self.url(&format!("/coins/{}", token_id), &[])?;
        let response = self.get(url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(AppError::NotFound(format!("Unknown token: {}", token_id))),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(AppError::ExternalApiError(format!(
                    "Failed to fetch token metadata ({}): {}",
                    status, error_text
                )))
            }
        }
    }

    /// Fetches the price history over the last `days` days
    pub async fn get_market_chart(
        &self,
        token_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> AppResult<MarketChart> {
        let days = days.to_string();
        let url = self.url(
            &format!("/coins/{}/market_chart", token_id),
            &[("vs_currency", vs_currency), ("days", &days)],
        )?;
        let response = self.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Failed to fetch market chart: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
