//! Snapshot retrieval with a file cache in front of the market data source

use crate::api::{MarketDataSource, YahooFinanceClient};
use crate::cache::HistoryCache;
use crate::config::CacheConfig;
use crate::error::{Result, StockError};
use crate::models::{HistoryPayload, Period, PriceSeries, StockSnapshot};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Fetches stock snapshots, consulting the cache first
pub struct DataProvider {
    source: Arc<dyn MarketDataSource>,
    cache: HistoryCache,
}

impl DataProvider {
    pub fn new(source: Arc<dyn MarketDataSource>, cache: HistoryCache) -> Self {
        Self { source, cache }
    }

    /// Provider backed by Yahoo Finance
    pub fn yahoo(cache: CacheConfig) -> Self {
        Self::new(Arc::new(YahooFinanceClient::new()), HistoryCache::new(cache))
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }

    /// Snapshot for `symbol` over `period`.
    ///
    /// Any failure to obtain data is reported as
    /// [`StockError::DataUnavailable`].
    #[instrument(skip(self))]
    pub async fn fetch(&self, symbol: &str, period: Period) -> Result<StockSnapshot> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(StockError::unavailable(symbol, "empty symbol"));
        }

        if let Some(snapshot) = self.cache.get(&symbol, period) {
            info!("Loaded {} ({}) from cache", symbol, period);
            return Ok(snapshot);
        }

        info!("Fetching {} ({}) from market data source", symbol, period);
        let snapshot = match self.load(&symbol, period).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Error fetching data for {}: {}", symbol, e);
                return Err(match e {
                    StockError::DataUnavailable { .. } => e,
                    other => StockError::unavailable(&symbol, other),
                });
            }
        };

        self.cache.put(&symbol, period, &snapshot);
        Ok(snapshot)
    }

    async fn load(&self, symbol: &str, period: Period) -> Result<StockSnapshot> {
        let history = self.source.history(symbol, period).await?;
        if history.is_empty() {
            return Err(StockError::unavailable(symbol, "No data found"));
        }

        // The 52-week range needs a full year even when the view is shorter.
        let year = if period.covers_one_year() {
            None
        } else {
            match self.source.history(symbol, Period::OneYear).await {
                Ok(series) if !series.is_empty() => Some(series),
                Ok(_) => None,
                Err(e) => {
                    warn!("No one-year history for {}: {}", symbol, e);
                    None
                }
            }
        };
        let (high, low) = fifty_two_week_range(year.as_ref().unwrap_or(&history));

        let last_close = history.last().map(|b| b.close).filter(|c| c.is_finite());
        let current_price = match self.source.latest(symbol).await {
            Ok(Some(price)) => Some(price),
            Ok(None) => last_close,
            Err(e) => {
                warn!("No latest quote for {}, using last close: {}", symbol, e);
                last_close
            }
        };

        Ok(StockSnapshot {
            current_price,
            market_cap: None,
            fifty_two_week_high: high,
            fifty_two_week_low: low,
            history: HistoryPayload::encode(&history)?,
        })
    }
}

/// Highest high and lowest low over the 365 days ending at the last bar
fn fifty_two_week_range(series: &PriceSeries) -> (Option<f64>, Option<f64>) {
    let Some(last) = series.last() else {
        return (None, None);
    };
    let cutoff = last.date - Duration::days(365);

    let recent = series.bars().iter().filter(|b| b.date >= cutoff);
    let high = recent
        .clone()
        .map(|b| b.high)
        .filter(|v| v.is_finite())
        .reduce(f64::max);
    let low = recent
        .map(|b| b.low)
        .filter(|v| v.is_finite())
        .reduce(f64::min);
    (high, low)
}
