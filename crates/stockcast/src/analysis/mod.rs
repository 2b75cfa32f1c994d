//! Numeric analysis over a price series: trend lines, forecasts and
//! momentum indicators

pub mod forecast;
pub mod indicators;
pub mod regression;
pub mod trend;

pub use forecast::{
    ConfidenceInterval, DEFAULT_HORIZON, Forecast, ForecastError, ForecastMethod, ForecastPoint,
    Forecaster,
};
pub use indicators::Momentum;
pub use trend::{TrendDetector, TrendKind, TrendLine, TrendLines};
