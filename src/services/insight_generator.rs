use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

const FALLBACK_REASONING: &str = "AI analysis unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "Bullish" => Some(Sentiment::Bullish),
            "Bearish" => Some(Sentiment::Bearish),
            "Neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub reasoning: String,
    pub sentiment: Sentiment,
}

impl Insight {
    pub fn fallback() -> Self {
        Self {
            reasoning: FALLBACK_REASONING.to_string(),
            sentiment: Sentiment::Neutral,
        }
    }
}

/// Market figures the prompt is built from, in the requested quote currency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketFigures {
    pub current_price: f64,
    pub market_cap: f64,
    pub total_volume: f64,
    pub price_change_percentage_24h: f64,
}

#[derive(Debug, Clone)]
pub struct InsightRequest {
    pub token_name: String,
    pub token_symbol: String,
    pub market: MarketFigures,
    pub price_history: Option<String>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct RawInsight {
    reasoning: Option<String>,
    sentiment: Option<String>,
}

/// Asks a Gemini model for a short market read.
///
/// Never fails: every error path degrades to [`Insight::fallback`].
#[derive(Clone)]
pub struct GeminiInsightGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiInsightGenerator {
    pub fn new(base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, request: &InsightRequest) -> Insight {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("Gemini API key not provided, using default insight");
            return Insight::fallback();
        };

        match self.generate_content(api_key, &build_prompt(request)).await {
            Ok(Some(text)) => parse_insight(&text).unwrap_or_else(|| {
                tracing::warn!("Could not parse Gemini response: {}", text);
                Insight::fallback()
            }),
            Ok(None) => {
                tracing::warn!("No content in Gemini response");
                Insight::fallback()
            }
            Err(e) => {
                tracing::error!("Error calling Gemini API: {:?}", e);
                Insight::fallback()
            }
        }
    }

    async fn generate_content(&self, api_key: &str, prompt: &str) -> Result<Option<String>, reqwest::Error> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        tracing::info!(model = %self.model, "Calling Gemini API");

        let response: GenerateContentResponse = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        Ok(Some(text).filter(|t| !t.trim().is_empty()))
    }
}

pub fn build_prompt(request: &InsightRequest) -> String {
    let market = &request.market;
    format!(
        "You are a cryptocurrency market analyst. Analyze the following token data and provide insights.\n\
         Token: {} ({})\n\
         Current Price: ${}\n\
         Market Cap: ${}\n\
         24h Volume: ${}\n\
         24h Price Change: {:.2}%\n\
         {}\n\
         Based on this data, provide a brief analysis (2-3 sentences) and determine the market sentiment.\n\
         Respond ONLY with valid JSON in this exact format (no markdown, no code blocks, no backticks):\n\
         {{\n  \"reasoning\": \"Your brief analysis here (2-3 sentences)\",\n  \"sentiment\": \"Bullish/Bearish/Neutral\"\n}}",
        request.token_name,
        request.token_symbol.to_uppercase(),
        group_thousands(market.current_price),
        group_thousands(market.market_cap),
        group_thousands(market.total_volume),
        market.price_change_percentage_24h,
        request.price_history.as_deref().unwrap_or_default(),
    )
}

/// Formats with two decimals and comma thousands separators
fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Strips a surrounding Markdown code fence, with or without a `json` tag
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parses a model reply into an insight; unknown sentiments become Neutral
pub fn parse_insight(text: &str) -> Option<Insight> {
    let raw: RawInsight = serde_json::from_str(strip_code_fence(text)).ok()?;

    let reasoning = raw.reasoning.filter(|r| !r.trim().is_empty())?;
    let sentiment = raw.sentiment.filter(|s| !s.trim().is_empty())?;

    let sentiment = Sentiment::parse(&sentiment).unwrap_or_else(|| {
        tracing::warn!("Invalid sentiment value: {}", sentiment);
        Sentiment::Neutral
    });

    Some(Insight {
        reasoning,
        sentiment,
    })
}
