use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::pnl_calculator::{DailyBucket, PnlSummary};
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PnlQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PnlResponse {
    pub wallet: String,
    pub start: String,
    pub end: String,
    pub daily: Vec<DailyBucket>,
    pub summary: PnlSummary,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub data_source: &'static str,
    pub last_api_call: String,
    pub notes: &'static str,
}

pub async fn get_daily_pnl(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
    Query(query): Query<PnlQuery>,
) -> AppResult<Json<PnlResponse>> {
    tracing::info!(
        "Received PnL request. Wallet: {}, Start: {:?}, End: {:?}",
        wallet,
        query.start,
        query.end
    );

    let present = |value: Option<String>| value.filter(|s| !s.is_empty());
    let (Some(start), Some(end)) = (present(query.start), present(query.end)) else {
        return Err(AppError::ValidationError(
            "Start and end dates are required".to_string(),
        ));
    };

    let range = validation::validate_pnl_request(&wallet, &start, &end, Utc::now().date_naive())?;

    let report = tokio::time::timeout(
        state.pnl_timeout,
        state.pnl_calculator.compute_daily_pnl(&wallet, range),
    )
    .await
    .map_err(|_| {
        AppError::Timeout(format!(
            "PnL computation exceeded {}s",
            state.pnl_timeout.as_secs()
        ))
    })??;

    Ok(Json(PnlResponse {
        wallet,
        start,
        end,
        daily: report.daily,
        summary: report.summary,
        diagnostics: Diagnostics {
            data_source: "hyperliquid_api",
            last_api_call: Utc::now().to_rfc3339(),
            notes: "Unrealized PnL and equity are current snapshots, reported on today's bucket only",
        },
    }))
}
