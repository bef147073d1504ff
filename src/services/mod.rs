pub mod ingestion;
pub mod insight_generator;
pub mod pnl_calculator;
pub mod token_insights;
