//! One analysis run: summary, charts and forecast for a symbol
//!
//! Every failure inside a run is turned into a fixed message or an absent
//! chart, so [`AnalysisPipeline::run`] always produces a report.

use crate::analysis::{Forecast, Forecaster, Momentum, TrendDetector};
use crate::charts::{Figure, indicator_chart, price_chart};
use crate::config::StockcastConfig;
use crate::error::{Result, StockError};
use crate::models::{Period, PriceSeries};
use crate::prompts::ReportType;
use crate::provider::DataProvider;
use crate::summarizer::{
    GENERATION_FAILED_MESSAGE, MISSING_KEY_MESSAGE, NO_STOCK_DATA_MESSAGE, Summarizer,
};
use crate::summary::{
    ForecastSummary, INSUFFICIENT_DATA_MESSAGE, NO_DATA_MESSAGE, TECHNICAL_ERROR_MESSAGE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Period of the snapshot handed to the summarizer
const SUMMARY_PERIOD: Period = Period::OneYear;

/// What to analyze
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub period: Period,
    pub report_type: ReportType,
    pub include_forecast: bool,
}

impl AnalysisRequest {
    /// One year of history, detailed report, forecast on
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            period: Period::default(),
            report_type: ReportType::default(),
            include_forecast: true,
        }
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = report_type;
        self
    }

    pub fn include_forecast(mut self, include: bool) -> Self {
        self.include_forecast = include;
        self
    }
}

/// Everything a front end shows for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    /// LLM summary, or one of the fixed summarizer messages
    pub summary: String,
    pub price_chart: Option<Figure>,
    pub indicator_chart: Option<Figure>,
    /// Forecast text, a fixed forecast message, or empty when not requested
    pub forecast_summary: String,
    pub forecast: Option<Forecast>,
}

/// Orchestrates data retrieval, analysis, charting and summarization
pub struct AnalysisPipeline {
    provider: DataProvider,
    summarizer: Summarizer,
    forecaster: Forecaster,
    detector: TrendDetector,
    min_history_rows: usize,
    trend_window: usize,
}

impl AnalysisPipeline {
    pub fn new(provider: DataProvider, summarizer: Summarizer, config: &StockcastConfig) -> Self {
        Self {
            provider,
            summarizer,
            forecaster: Forecaster::new(config.forecast_horizon),
            detector: TrendDetector::default(),
            min_history_rows: config.min_history_rows,
            trend_window: config.trend_display_window,
        }
    }

    /// Yahoo Finance data with Gemini summaries
    pub fn from_config(config: &StockcastConfig) -> Result<Self> {
        config.validate()?;
        let provider = DataProvider::yahoo(config.cache.clone());
        let summarizer = Summarizer::from_config(config)?;
        Ok(Self::new(provider, summarizer, config))
    }

    pub fn provider(&self) -> &DataProvider {
        &self.provider
    }

    #[instrument(skip(self), fields(symbol = %request.symbol))]
    pub async fn run(&self, request: &AnalysisRequest) -> AnalysisReport {
        let symbol = request.symbol.trim().to_uppercase();
        info!("Running analysis for {} ({})", symbol, request.period);

        let summary = self.summary(&symbol, request.report_type).await;

        let series = match self.series(&symbol, request.period).await {
            Ok(series) => series,
            Err(e) => {
                error!("No data retrieved for {}: {}", symbol, e);
                return AnalysisReport {
                    symbol,
                    summary,
                    price_chart: None,
                    indicator_chart: None,
                    forecast_summary: if request.include_forecast {
                        forecast_failure_message(&e).to_string()
                    } else {
                        String::new()
                    },
                    forecast: None,
                };
            }
        };

        let (forecast, forecast_summary) = if request.include_forecast {
            match self.forecast_series(&symbol, &series) {
                Ok(forecast) => {
                    let text = forecast_text(&symbol, &series, &forecast);
                    (Some(forecast), text)
                }
                Err(e) => {
                    error!("Error generating forecast for {}: {}", symbol, e);
                    (None, forecast_failure_message(&e).to_string())
                }
            }
        } else {
            (None, String::new())
        };

        let trends = self.detector.detect(&series);
        if trends.is_empty() {
            debug!("No support or resistance line for {}", symbol);
        }
        let price = price_chart(&symbol, &series, &trends, forecast.as_ref(), self.trend_window);
        let indicators = match Momentum::compute(&series.closes()) {
            Ok(momentum) => Some(indicator_chart(&symbol, &series, &momentum)),
            Err(e) => {
                warn!("Indicator chart unavailable for {}: {}", symbol, e);
                None
            }
        };

        AnalysisReport {
            symbol,
            summary,
            price_chart: Some(price),
            indicator_chart: indicators,
            forecast_summary,
            forecast,
        }
    }

    /// LLM summary for `symbol`, or the fixed message for whichever step failed
    pub async fn summary(&self, symbol: &str, report_type: ReportType) -> String {
        if !self.summarizer.is_configured() {
            return MISSING_KEY_MESSAGE.to_string();
        }

        let snapshot = match self.provider.fetch(symbol, SUMMARY_PERIOD).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Summary data unavailable for {}: {}", symbol, e);
                return NO_STOCK_DATA_MESSAGE.to_string();
            }
        };

        match self.summarizer.summarize(&report_type.query(symbol), &snapshot).await {
            Ok(text) => text,
            Err(StockError::CredentialMissing(_)) => MISSING_KEY_MESSAGE.to_string(),
            Err(e) => {
                error!("Error running summarizer for {}: {}", symbol, e);
                GENERATION_FAILED_MESSAGE.to_string()
            }
        }
    }

    async fn series(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        let series = self.provider.fetch(symbol, period).await?.series()?;
        if series.is_empty() {
            return Err(StockError::unavailable(symbol, "empty history"));
        }
        Ok(series)
    }

    /// Price history and forecast for `symbol`
    ///
    /// Fails with `DataUnavailable` when no history can be fetched,
    /// `InsufficientHistory` below the configured row minimum and `ModelFit`
    /// when the forecaster rejects the series.
    #[instrument(skip(self))]
    pub async fn forecast(&self, symbol: &str, period: Period) -> Result<(PriceSeries, Forecast)> {
        let symbol = symbol.trim().to_uppercase();
        let series = self.series(&symbol, period).await?;
        let forecast = self.forecast_series(&symbol, &series)?;
        Ok((series, forecast))
    }

    fn forecast_series(&self, symbol: &str, series: &PriceSeries) -> Result<Forecast> {
        if series.len() < self.min_history_rows {
            warn!(
                "Insufficient data for {}, only {} records",
                symbol,
                series.len()
            );
            return Err(StockError::InsufficientHistory {
                rows: series.len(),
                required: self.min_history_rows,
            });
        }

        let forecast = self.forecaster.forecast(series)?;
        Ok(forecast)
    }
}

/// Fixed forecast text shown in place of a failed forecast step
pub fn forecast_failure_message(err: &StockError) -> &'static str {
    match err {
        StockError::InsufficientHistory { .. } => INSUFFICIENT_DATA_MESSAGE,
        StockError::ModelFit(_) => TECHNICAL_ERROR_MESSAGE,
        _ => NO_DATA_MESSAGE,
    }
}

/// Markdown forecast summary, or the technical-error message when the
/// forecast cannot be summarized
pub fn forecast_text(symbol: &str, series: &PriceSeries, forecast: &Forecast) -> String {
    let current = series.last().map_or(f64::NAN, |b| b.close);
    match ForecastSummary::new(symbol, current, forecast) {
        Some(summary) => summary.to_string(),
        None => {
            error!("Error generating forecast summary for {}", symbol);
            TECHNICAL_ERROR_MESSAGE.to_string()
        }
    }
}
