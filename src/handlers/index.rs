use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiRoute {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

const API_ROUTES: [ApiRoute; 2] = [
    ApiRoute {
        method: "POST",
        path: "/api/token/{id}/insight",
        description: "Token insights (body: { vs_currency, history_days })",
    },
    ApiRoute {
        method: "GET",
        path: "/api/hyperliquid/{wallet}/pnl",
        description: "HyperLiquid PnL (query: start, end)",
    },
];

/// Route catalogue for API consumers
pub async fn list_routes() -> Json<&'static [ApiRoute]> {
    Json(&API_ROUTES)
}
