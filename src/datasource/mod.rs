pub mod coingecko;
pub mod hyperliquid;
#[cfg(test)]
pub mod mock;
pub mod pagination;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::error::FetchError;
use hyperliquid::{AccountSnapshot, Fill, FundingEvent};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Inclusive window of epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeWindow {
    /// Covers `start` 00:00:00.000 UTC through `end` 23:59:59.999 UTC
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        let midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        Self {
            start_ms: midnight(start),
            end_ms: midnight(end) + MILLIS_PER_DAY - 1,
        }
    }
}

/// Trait for data sources that provide trading history
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Get every fill inside the window, following pagination to the end
    async fn get_fills(&self, wallet: &str, window: TimeWindow) -> Result<Vec<Fill>, FetchError>;

    /// Get every funding payment inside the window, following pagination to the end
    async fn get_funding(
        &self,
        wallet: &str,
        window: TimeWindow,
    ) -> Result<Vec<FundingEvent>, FetchError>;

    /// Get the user's current positions and margin summary
    async fn get_account_snapshot(&self, wallet: &str) -> Result<AccountSnapshot, FetchError>;
}
