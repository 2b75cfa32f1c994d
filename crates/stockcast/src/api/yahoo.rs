//! Yahoo Finance market data source

use super::MarketDataSource;
use crate::error::{Result, StockError};
use crate::models::{Period, PriceBar, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Yahoo Finance client backed by the public chart endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| StockError::YahooFinanceError(e.to_string()))
    }

    /// Daily bars between `start` and `end`
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let provider = Self::connector()?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let mut bars = Vec::with_capacity(quotes.len());
        for q in &quotes {
            let Some(date) = DateTime::from_timestamp(q.timestamp as i64, 0) else {
                debug!("Skipping quote with out-of-range timestamp {}", q.timestamp);
                continue;
            };
            bars.push(PriceBar {
                date,
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume as f64,
            });
        }

        PriceSeries::new(bars)
    }
}

/// First instant of the window ending at `end`
pub fn period_start(period: Period, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let days = match period {
        Period::OneMonth => 30,
        Period::ThreeMonths => 90,
        Period::SixMonths => 180,
        Period::OneYear => 365,
        Period::TwoYears => 730,
        Period::FiveYears => 1825,
        Period::TenYears => 3650,
        Period::Max => 36500,
        Period::YearToDate => {
            return NaiveDate::from_ymd_opt(end.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
                .ok_or_else(|| StockError::InvalidPeriod(format!("ytd for year {}", end.year())));
        }
    };
    Ok(end - Duration::days(days))
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = period_start(period, end)?;
        self.get_historical_quotes(symbol, start, end).await
    }

    #[instrument(skip(self))]
    async fn latest(&self, symbol: &str) -> Result<Option<f64>> {
        let provider = Self::connector()?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        Ok(Some(quote.close).filter(|p| p.is_finite()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_start() {
        let end = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        assert_eq!(
            period_start(Period::OneMonth, end).unwrap(),
            end - Duration::days(30)
        );
        assert_eq!(
            period_start(Period::OneYear, end).unwrap(),
            end - Duration::days(365)
        );
        assert_eq!(
            period_start(Period::YearToDate, end).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(period_start(Period::Max, end).unwrap() < period_start(Period::TenYears, end).unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_history() {
        let client = YahooFinanceClient::new();
        let series = client.history("AAPL", Period::OneMonth).await.unwrap();

        assert!(!series.is_empty());
        assert!(series.closes().iter().all(|c| *c > 0.0));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_latest() {
        let client = YahooFinanceClient::new();
        let price = client.latest("AAPL").await.unwrap();
        assert!(price.unwrap() > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_symbol_is_error() {
        let client = YahooFinanceClient::new();
        assert!(client.history("INVALID_SYMBOL_12345", Period::OneMonth).await.is_err());
    }
}
