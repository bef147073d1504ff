use serde::Serialize;
use serde_json::{Map, Value};

use crate::datasource::coingecko::{CoinGeckoClient, CoinMarketData};
use crate::error::AppResult;
use crate::services::insight_generator::{GeminiInsightGenerator, Insight, InsightRequest, MarketFigures};

#[derive(Debug, Clone, Serialize)]
pub struct TokenInsight {
    pub source: &'static str,
    pub token: TokenSummary,
    pub insight: Insight,
    pub model: ModelInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenSummary {
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Keys carry the quote currency, e.g. `current_price_usd`
    pub market_data: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub provider: &'static str,
    pub model: String,
}

pub struct TokenInsightService {
    market: CoinGeckoClient,
    generator: GeminiInsightGenerator,
}

impl TokenInsightService {
    pub fn new(market: CoinGeckoClient, generator: GeminiInsightGenerator) -> Self {
        Self { market, generator }
    }

    /// Combines token metadata, recent price history and a model-generated read.
    /// Only the metadata fetch is required; history and insight degrade quietly.
    pub async fn token_insight(
        &self,
        token_id: &str,
        vs_currency: &str,
        history_days: u32,
    ) -> AppResult<TokenInsight> {
        tracing::info!(token_id, vs_currency, history_days, "Fetching token insight");

        let metadata = self.market.get_coin(token_id).await?;
        let figures = market_figures(metadata.market_data.as_ref(), vs_currency);

        let price_history = match self
            .market
            .get_market_chart(token_id, vs_currency, history_days)
            .await
        {
            Ok(chart) => price_history_text(history_days, &chart.prices),
            Err(e) => {
                tracing::warn!("Failed to fetch market chart data: {}", e);
                None
            }
        };

        let name = metadata.name.unwrap_or_default();
        let symbol = metadata.symbol.unwrap_or_default();

        let insight = self
            .generator
            .generate(&InsightRequest {
                token_name: if name.is_empty() { token_id.to_string() } else { name.clone() },
                token_symbol: symbol.clone(),
                market: figures.clone(),
                price_history,
            })
            .await;

        Ok(TokenInsight {
            source: "coingecko",
            token: TokenSummary {
                id: metadata.id.unwrap_or_else(|| token_id.to_string()),
                symbol,
                name,
                market_data: keyed_market_data(&figures, vs_currency),
            },
            insight,
            model: ModelInfo {
                provider: "google",
                model: self.generator.model().to_string(),
            },
        })
    }
}

fn market_figures(market_data: Option<&CoinMarketData>, vs_currency: &str) -> MarketFigures {
    let Some(data) = market_data else {
        return MarketFigures::default();
    };
    let pick = |series: &std::collections::HashMap<String, Option<f64>>| {
        series.get(vs_currency).copied().flatten().unwrap_or_default()
    };

    MarketFigures {
        current_price: pick(&data.current_price),
        market_cap: pick(&data.market_cap),
        total_volume: pick(&data.total_volume),
        price_change_percentage_24h: data.price_change_percentage_24h.unwrap_or_default(),
    }
}

fn keyed_market_data(figures: &MarketFigures, vs_currency: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(format!("current_price_{}", vs_currency), figures.current_price.into());
    map.insert(format!("market_cap_{}", vs_currency), figures.market_cap.into());
    map.insert(format!("total_volume_{}", vs_currency), figures.total_volume.into());
    map.insert(
        "price_change_percentage_24h".to_string(),
        figures.price_change_percentage_24h.into(),
    );
    map
}

/// Describes the move from the first to the last price point
fn price_history_text(days: u32, prices: &[(f64, f64)]) -> Option<String> {
    let (_, first) = *prices.first()?;
    let (_, last) = *prices.last()?;
    if first == 0.0 {
        return None;
    }

    let change = (last - first) / first * 100.0;
    Some(format!(
        "Over the past {} days, the price changed by {:.2}% (from ${:.2} to ${:.2}).",
        days, change, first, last
    ))
}
