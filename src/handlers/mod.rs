pub mod index;
pub mod insight;
pub mod pnl;
