use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::try_join3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::datasource::hyperliquid::{AccountSnapshot, Fill, FundingEvent};
use crate::datasource::TimeWindow;
use crate::error::{AppError, AppResult};
use crate::services::ingestion::IngestionService;

/// Inclusive range of UTC calendar days. `start <= end` is checked by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_dates(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub realized_pnl_usd: BigDecimal,
    pub unrealized_pnl_usd: BigDecimal,
    pub fees_usd: BigDecimal,
    pub funding_usd: BigDecimal,
    pub net_pnl_usd: BigDecimal,
    pub equity_usd: BigDecimal,
}

impl DailyBucket {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            realized_pnl_usd: BigDecimal::from(0),
            unrealized_pnl_usd: BigDecimal::from(0),
            fees_usd: BigDecimal::from(0),
            funding_usd: BigDecimal::from(0),
            net_pnl_usd: BigDecimal::from(0),
            equity_usd: BigDecimal::from(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlSummary {
    pub total_realized_usd: BigDecimal,
    pub total_unrealized_usd: BigDecimal,
    pub total_fees_usd: BigDecimal,
    pub total_funding_usd: BigDecimal,
    pub net_pnl_usd: BigDecimal,
}

impl PnlSummary {
    /// Field-wise sum; `net_pnl_usd` is the sum of the buckets' own nets.
    fn from_buckets(buckets: &[DailyBucket]) -> Self {
        let mut summary = Self {
            total_realized_usd: BigDecimal::from(0),
            total_unrealized_usd: BigDecimal::from(0),
            total_fees_usd: BigDecimal::from(0),
            total_funding_usd: BigDecimal::from(0),
            net_pnl_usd: BigDecimal::from(0),
        };

        for day in buckets {
            summary.total_realized_usd += &day.realized_pnl_usd;
            summary.total_unrealized_usd += &day.unrealized_pnl_usd;
            summary.total_fees_usd += &day.fees_usd;
            summary.total_funding_usd += &day.funding_usd;
            summary.net_pnl_usd += &day.net_pnl_usd;
        }

        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlReport {
    pub daily: Vec<DailyBucket>,
    pub summary: PnlSummary,
}

pub struct PnlCalculator {
    ingestion: Arc<IngestionService>,
}

impl PnlCalculator {
    pub fn new(ingestion: Arc<IngestionService>) -> Self {
        Self { ingestion }
    }

    /// Fetches fills, funding and the account snapshot concurrently and folds
    /// them into one bucket per day of `range`. Any fetch failure fails the
    /// whole computation.
    pub async fn compute_daily_pnl(&self, wallet: &str, range: DateRange) -> AppResult<PnlReport> {
        let window = range.window();

        let (fills, funding, snapshot) = try_join3(
            self.ingestion.fetch_fills(wallet, window),
            self.ingestion.fetch_funding(wallet, window),
            self.ingestion.fetch_account_snapshot(wallet),
        )
        .await?;

        build_report(range, &fills, &funding, &snapshot, Utc::now().date_naive())
    }
}

/// Folds already-fetched records into daily buckets.
///
/// Buckets exist for every day of `range` before folding starts; records
/// dated outside it are dropped. The snapshot only lands in the `today`
/// bucket: unrealized PnL is summed over positions, equity is assigned.
pub fn build_report(
    range: DateRange,
    fills: &[Fill],
    funding: &[FundingEvent],
    snapshot: &AccountSnapshot,
    today: NaiveDate,
) -> AppResult<PnlReport> {
    let mut buckets: BTreeMap<NaiveDate, DailyBucket> = range
        .days()
        .map(|day| (day, DailyBucket::empty(day)))
        .collect();
    let mut dropped = 0usize;

    for fill in fills {
        let Some(bucket) = bucket_for(&mut buckets, fill.time) else {
            tracing::trace!(coin = %fill.coin, time = fill.time, "Fill outside range");
            dropped += 1;
            continue;
        };
        bucket.realized_pnl_usd += parse_decimal("closedPnl", &fill.closed_pnl)?;
        bucket.fees_usd += parse_decimal("fee", &fill.fee)?;
    }

    for payment in funding {
        let Some(bucket) = bucket_for(&mut buckets, payment.time) else {
            tracing::trace!(coin = %payment.coin, time = payment.time, "Funding outside range");
            dropped += 1;
            continue;
        };
        bucket.funding_usd += parse_decimal("usdc", &payment.usdc)?;
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} records dated outside {}..={}", dropped, range.start, range.end);
    }

    if let Some(bucket) = buckets.get_mut(&today) {
        apply_snapshot(bucket, snapshot)?;
    }

    for bucket in buckets.values_mut() {
        bucket.net_pnl_usd = &bucket.realized_pnl_usd + &bucket.unrealized_pnl_usd
            - &bucket.fees_usd
            + &bucket.funding_usd;
    }

    let daily: Vec<DailyBucket> = buckets.into_values().collect();
    let summary = PnlSummary::from_buckets(&daily);

    Ok(PnlReport { daily, summary })
}

fn bucket_for(
    buckets: &mut BTreeMap<NaiveDate, DailyBucket>,
    timestamp_ms: i64,
) -> Option<&mut DailyBucket> {
    let date = DateTime::<Utc>::from_timestamp_millis(timestamp_ms)?.date_naive();
    buckets.get_mut(&date)
}

fn apply_snapshot(bucket: &mut DailyBucket, snapshot: &AccountSnapshot) -> AppResult<()> {
    for asset in snapshot.asset_positions.iter().flatten() {
        if let Some(pnl) = &asset.position.unrealized_pnl {
            tracing::trace!(coin = %asset.position.coin, unrealized = %pnl, "Open position");
            bucket.unrealized_pnl_usd += parse_decimal("unrealizedPnl", pnl)?;
        }
    }

    if let Some(account_value) = snapshot
        .margin_summary
        .as_ref()
        .and_then(|summary| summary.account_value.as_deref())
    {
        bucket.equity_usd = parse_decimal("accountValue", account_value)?;
    }

    Ok(())
}

fn parse_decimal(field: &'static str, value: &str) -> AppResult<BigDecimal> {
    BigDecimal::from_str(value).map_err(|_| AppError::MalformedNumber {
        field,
        value: value.to_string(),
    })
}
