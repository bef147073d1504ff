use async_trait::async_trait;

use super::hyperliquid::{AccountSnapshot, Fill, FundingEvent};
use super::{DataSource, TimeWindow};
use crate::error::{FetchError, FetchSource};

/// In-memory data source with canned records and an optional failing source
#[derive(Default)]
pub struct MockDataSource {
    pub fills: Vec<Fill>,
    pub funding: Vec<FundingEvent>,
    pub snapshot: AccountSnapshot,
    pub failing: Option<FetchSource>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fills(mut self, fills: Vec<Fill>) -> Self {
        self.fills = fills;
        self
    }

    pub fn with_funding(mut self, funding: Vec<FundingEvent>) -> Self {
        self.funding = funding;
        self
    }

    pub fn with_snapshot(mut self, snapshot: AccountSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn failing_on(mut self, source: FetchSource) -> Self {
        self.failing = Some(source);
        self
    }

    fn check(&self, source: FetchSource) -> Result<(), FetchError> {
        match self.failing {
            Some(failing) if failing == source => {
                Err(FetchError::status(source, 500, "injected failure"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn get_fills(&self, _wallet: &str, window: TimeWindow) -> Result<Vec<Fill>, FetchError> {
        self.check(FetchSource::Fills)?;
        Ok(self
            .fills
            .iter()
            .filter(|f| f.time >= window.start_ms && f.time <= window.end_ms)
            .cloned()
            .collect())
    }

    async fn get_funding(
        &self,
        _wallet: &str,
        window: TimeWindow,
    ) -> Result<Vec<FundingEvent>, FetchError> {
        self.check(FetchSource::Funding)?;
        Ok(self
            .funding
            .iter()
            .filter(|f| f.time >= window.start_ms && f.time <= window.end_ms)
            .cloned()
            .collect())
    }

    async fn get_account_snapshot(&self, _wallet: &str) -> Result<AccountSnapshot, FetchError> {
        self.check(FetchSource::AccountSnapshot)?;
        Ok(self.snapshot.clone())
    }
}
