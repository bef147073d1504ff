use axum::{
    body::Body,
    http::{header, Method, Request},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod config;
mod datasource;
mod error;
mod handlers;
mod services;
#[cfg(test)]
mod test_support;
mod validation;

use config::AppConfig;
use datasource::coingecko::CoinGeckoClient;
use datasource::hyperliquid::HyperliquidInfoClient;
use datasource::DataSource;
use services::ingestion::IngestionService;
use services::insight_generator::GeminiInsightGenerator;
use services::pnl_calculator::PnlCalculator;
use services::token_insights::TokenInsightService;

#[derive(Clone)]
pub struct AppState {
    pub pnl_calculator: Arc<PnlCalculator>,
    pub token_insights: Arc<TokenInsightService>,
    pub pnl_timeout: Duration,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hyperpnl_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Initialize data sources
    let datasource: Arc<dyn DataSource> = Arc::new(
        HyperliquidInfoClient::new(&config.hyperliquid_info_url)
            .with_page_size(config.hyperliquid_page_size),
    );
    let market = CoinGeckoClient::new(&config.coingecko_api_url, config.coingecko_api_key.clone());
    let generator = GeminiInsightGenerator::new(
        &config.gemini_api_url,
        config.gemini_api_key.clone(),
        &config.gemini_model,
    );

    // Initialize services
    let ingestion_service = Arc::new(IngestionService::new(datasource));
    let pnl_calculator = Arc::new(PnlCalculator::new(ingestion_service));
    let token_insights = Arc::new(TokenInsightService::new(market, generator));

    let state = AppState {
        pnl_calculator,
        token_insights,
        pnl_timeout: config.pnl_timeout,
    };

    let app = build_router(state);

    let addr = config.bind_addr();
    tracing::info!("Starting PnL API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        uri = %request.uri(),
    )
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let trace = TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(handlers::index::list_routes))
        .route("/health", get(|| async { "OK" }))
        .route("/api/hyperliquid/{wallet}/pnl", get(handlers::pnl::get_daily_pnl))
        .route("/api/token/{id}/insight", post(handlers::insight::post_token_insight))
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
        .with_state(state)
}

/// State backed by an in-memory data source; market and model clients point nowhere
#[cfg(test)]
pub fn test_state(source: datasource::mock::MockDataSource) -> AppState {
    let ingestion = Arc::new(IngestionService::new(Arc::new(source)));
    AppState {
        pnl_calculator: Arc::new(PnlCalculator::new(ingestion)),
        token_insights: Arc::new(TokenInsightService::new(
            CoinGeckoClient::new("http://127.0.0.1:1", None),
            GeminiInsightGenerator::new("http://127.0.0.1:1", None, "gemini-2.5-flash"),
        )),
        pnl_timeout: Duration::from_secs(5),
    }
}
