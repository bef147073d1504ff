mod info_client;
pub mod types;

pub use info_client::{HyperliquidInfoClient, DEFAULT_PAGE_SIZE};
pub use types::{AccountSnapshot, Fill, FundingEvent};
