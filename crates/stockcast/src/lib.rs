//! Equity price forecasting and chart generation
//!
//! This crate fetches daily price history, forecasts the next few trading
//! days and renders the results. It includes:
//!
//! - A file cache in front of Yahoo Finance (`cache`, `api`, `provider`)
//! - Support and resistance trend lines from local extrema
//! - A degree-2 polynomial forecast with volatility-scaled 95% bands,
//!   falling back to a linear trend when the model cannot be fitted
//! - EMA, MACD and RSI for the momentum chart
//! - Plotly chart documents exported as JSON or standalone HTML
//! - LLM summaries through `stockcast-llm`
//!
//! # Example
//!
//! ```rust,ignore
//! use stockcast::{AnalysisPipeline, AnalysisRequest, StockcastConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockcastConfig::builder().with_env_api_key().build()?;
//!     let pipeline = AnalysisPipeline::from_config(&config)?;
//!
//!     let report = pipeline.run(&AnalysisRequest::new("AAPL")).await;
//!     println!("{}", report.forecast_summary);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod cache;
pub mod charts;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod summarizer;
pub mod summary;

pub use analysis::{Forecast, ForecastMethod, ForecastPoint, Forecaster, TrendDetector, TrendLines};
pub use api::{MarketDataSource, YahooFinanceClient};
pub use cache::HistoryCache;
pub use charts::Figure;
pub use config::{CacheConfig, StockcastConfig};
pub use error::{Result, StockError};
pub use models::{HistoryPayload, Period, PriceBar, PriceSeries, StockSnapshot};
pub use pipeline::{AnalysisPipeline, AnalysisReport, AnalysisRequest};
pub use prompts::ReportType;
pub use provider::DataProvider;
pub use summarizer::Summarizer;
pub use summary::ForecastSummary;
