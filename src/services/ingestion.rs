use std::sync::Arc;

use crate::datasource::hyperliquid::{AccountSnapshot, Fill, FundingEvent};
use crate::datasource::{DataSource, TimeWindow};
use crate::error::FetchError;

pub struct IngestionService {
    datasource: Arc<dyn DataSource>,
}

impl IngestionService {
    pub fn new(datasource: Arc<dyn DataSource>) -> Self {
        Self { datasource }
    }

    /// Fetches all fills for a wallet inside the window, across as many pages as needed
    pub async fn fetch_fills(&self, wallet: &str, window: TimeWindow) -> Result<Vec<Fill>, FetchError> {
        tracing::info!("Fetching fills for wallet: {}", wallet);
        let fills = self.datasource.get_fills(wallet, window).await?;
        tracing::info!("Fetched {} fills", fills.len());
        Ok(fills)
    }

    /// Fetches all funding payments for a wallet inside the window
    pub async fn fetch_funding(
        &self,
        wallet: &str,
        window: TimeWindow,
    ) -> Result<Vec<FundingEvent>, FetchError> {
        tracing::info!("Fetching funding for wallet: {}", wallet);
        let funding = self.datasource.get_funding(wallet, window).await?;
        tracing::info!("Fetched {} funding payments", funding.len());
        Ok(funding)
    }

    /// Fetches current account state (open positions, margin summary)
    pub async fn fetch_account_snapshot(&self, wallet: &str) -> Result<AccountSnapshot, FetchError> {
        tracing::info!("Fetching account snapshot for wallet: {}", wallet);
        self.datasource.get_account_snapshot(wallet).await
    }
}
