//! Market data sources

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::models::{Period, PriceSeries};
use async_trait::async_trait;

/// Source of daily price history and latest quotes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily OHLCV bars covering `period`, oldest first
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries>;

    /// Most recent traded price, if the source reports one
    async fn latest(&self, symbol: &str) -> Result<Option<f64>>;
}
