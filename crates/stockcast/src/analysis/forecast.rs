//! Short-horizon price forecasting
//!
//! A degree-2 polynomial regression of close on `[day, ln(volume + 1),
//! close(t-1), close(t-5)]` is rolled forward one day at a time, feeding
//! each prediction back in as the next lag. If the model cannot be fitted
//! the forecast falls back to a straight line through the recent closes.
//! Bands widen with the square root of time, scaled by annualized
//! volatility of recent log returns.

use super::regression::{LinearModel, linear_fit, polynomial_features};
use crate::models::PriceSeries;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, warn};

/// Default number of trading days projected
pub const DEFAULT_HORIZON: usize = 15;

const LAG: usize = 5;
const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const Z_95: f64 = 1.96;

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("forecast horizon must be at least one day")]
    ZeroHorizon,

    #[error("{rows} usable feature rows, at least {required} required")]
    InsufficientRows { rows: usize, required: usize },

    #[error("least-squares solve failed: {0}")]
    Solver(String),

    #[error("model produced non-finite values")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    Polynomial,
    LinearTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Trading days after the last observed close, starting at 1
    pub step: usize,
    pub price: f64,
    pub interval: ConfidenceInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub method: ForecastMethod,
    /// Annualized volatility used for the bands
    pub volatility: f64,
}

impl Forecast {
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn last(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }

    /// Lowest and highest projected price
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let prices = self.prices();
        let min = prices.iter().copied().reduce(f64::min)?;
        let max = prices.iter().copied().reduce(f64::max)?;
        Some((min, max))
    }
}

/// Forecast parameters
#[derive(Debug, Clone, Copy)]
pub struct Forecaster {
    pub horizon: usize,
    /// Trailing closes used for volatility and the linear fallback
    pub lookback: usize,
    /// Minimum usable feature rows for the polynomial fit
    pub min_fit_rows: usize,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            lookback: 30,
            min_fit_rows: 6,
        }
    }
}

impl Forecaster {
    pub fn new(horizon: usize) -> Self {
        Self {
            horizon,
            ..Self::default()
        }
    }

    pub fn forecast(&self, series: &PriceSeries) -> Result<Forecast, ForecastError> {
        self.forecast_values(&series.closes(), &series.volumes())
    }

    /// Forecast from parallel close and volume columns
    pub fn forecast_values(
        &self,
        closes: &[f64],
        volumes: &[f64],
    ) -> Result<Forecast, ForecastError> {
        if closes.is_empty() {
            return Err(ForecastError::EmptySeries);
        }
        if self.horizon == 0 {
            return Err(ForecastError::ZeroHorizon);
        }

        let (prices, method) = match self.polynomial(closes, volumes) {
            Ok(prices) => (prices, ForecastMethod::Polynomial),
            Err(e) => {
                warn!("Polynomial model failed, using linear trend: {}", e);
                (self.linear_trend(closes)?, ForecastMethod::LinearTrend)
            }
        };

        let volatility = annualized_volatility(closes, self.lookback);
        let points = prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| {
                let price = price.max(0.0);
                let width = price * volatility * ((i + 1) as f64 / TRADING_DAYS_PER_YEAR).sqrt() * Z_95;
                ForecastPoint {
                    step: i + 1,
                    price,
                    interval: ConfidenceInterval {
                        lower: (price - width).max(0.0),
                        upper: price + width,
                    },
                }
            })
            .collect();

        Ok(Forecast {
            points,
            method,
            volatility,
        })
    }

    fn polynomial(&self, closes: &[f64], volumes: &[f64]) -> Result<Vec<f64>, ForecastError> {
        let n = closes.len();
        let mut rows = Vec::with_capacity(n.saturating_sub(LAG));
        let mut targets = Vec::with_capacity(n.saturating_sub(LAG));
        for t in LAG..n {
            let volume = volumes.get(t).copied().unwrap_or(1.0);
            let features = [t as f64, (volume + 1.0).ln(), closes[t - 1], closes[t - LAG]];
            if features.iter().all(|f| f.is_finite()) && closes[t].is_finite() {
                rows.push(polynomial_features(&features));
                targets.push(closes[t]);
            }
        }
        if rows.len() < self.min_fit_rows {
            return Err(ForecastError::InsufficientRows {
                rows: rows.len(),
                required: self.min_fit_rows,
            });
        }

        let model = LinearModel::fit(&rows, &targets)?;
        debug!("Fitted polynomial model on {} rows", rows.len());

        let volume = volumes
            .iter()
            .rev()
            .copied()
            .find(|v| v.is_finite())
            .unwrap_or(0.0);
        let log_volume = (volume + 1.0).ln();

        // Last five known-or-predicted closes, oldest at the front.
        let mut recent: VecDeque<f64> = closes[n - LAG..].iter().copied().collect();
        let mut out = Vec::with_capacity(self.horizon);
        for i in 0..self.horizon {
            let lag1 = recent.back().copied().unwrap_or(f64::NAN);
            let lag5 = recent.front().copied().unwrap_or(f64::NAN);
            let features = [(n + i) as f64, log_volume, lag1, lag5];
            let prediction = model.predict(&polynomial_features(&features));
            if !prediction.is_finite() {
                return Err(ForecastError::NonFinite);
            }
            out.push(prediction);
            recent.pop_front();
            recent.push_back(prediction);
        }
        Ok(out)
    }

    /// Straight line through the last `lookback` closes, continued forward
    fn linear_trend(&self, closes: &[f64]) -> Result<Vec<f64>, ForecastError> {
        let window = &closes[closes.len().saturating_sub(self.lookback)..];
        let k = window.len();

        let (xs, ys): (Vec<f64>, Vec<f64>) = window
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_finite())
            .map(|(x, &c)| (x as f64, c))
            .unzip();

        if let Some((slope, intercept)) = linear_fit(&xs, &ys) {
            return Ok((0..self.horizon)
                .map(|i| intercept + slope * (k + i) as f64)
                .collect());
        }

        let last = closes
            .iter()
            .rev()
            .copied()
            .find(|c| c.is_finite())
            .ok_or(ForecastError::NonFinite)?;
        Ok(vec![last; self.horizon])
    }
}

/// Population standard deviation of daily log returns over the last
/// `lookback` closes, scaled to a year
pub fn annualized_volatility(closes: &[f64], lookback: usize) -> f64 {
    let window = &closes[closes.len().saturating_sub(lookback)..];
    let returns: Vec<f64> = window
        .windows(2)
        .map(|w| (w[1] / w[0]).ln())
        .filter(|r| r.is_finite())
        .collect();
    if returns.is_empty() {
        return 0.0;
    }

    let std = returns.iter().population_std_dev();
    if std.is_finite() {
        std * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::series_from_closes;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    fn assert_ordered(forecast: &Forecast) {
        for point in &forecast.points {
            let ci = point.interval;
            assert!(0.0 <= ci.lower, "{point:?}");
            assert!(ci.lower <= point.price, "{point:?}");
            assert!(point.price <= ci.upper, "{point:?}");
        }
    }

    #[test]
    fn test_rising_series_forecast_keeps_rising() {
        let series = series_from_closes(&rising(40));
        let forecast = Forecaster::default().forecast(&series).unwrap();

        assert_eq!(forecast.method, ForecastMethod::Polynomial);
        assert_eq!(forecast.points.len(), 15);
        let prices = forecast.prices();
        assert!(prices.windows(2).all(|w| w[1] > w[0]), "{prices:?}");
        assert!((prices[0] - 140.0).abs() < 1e-3, "{prices:?}");
        assert_ordered(&forecast);
    }

    #[test]
    fn test_bands_widen_with_horizon() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + i as f64 * 0.3 + if i % 2 == 0 { 1.5 } else { -1.5 })
            .collect();
        let volumes: Vec<f64> = (0..60).map(|i| 1e6 + (i % 7) as f64 * 1e4).collect();
        let forecast = Forecaster::default().forecast_values(&closes, &volumes).unwrap();

        assert!(forecast.volatility > 0.0);
        let widths: Vec<f64> = forecast
            .points
            .iter()
            .map(|p| (p.interval.upper - p.interval.lower) / p.price)
            .collect();
        assert!(widths.windows(2).all(|w| w[1] > w[0]), "{widths:?}");
        assert_ordered(&forecast);
    }

    #[test]
    fn test_too_few_rows_falls_back_to_linear_trend() {
        let closes = rising(10);
        let forecast = Forecaster::default()
            .forecast_values(&closes, &[1e6; 10])
            .unwrap();

        assert_eq!(forecast.method, ForecastMethod::LinearTrend);
        // Continues the line past the end of the window: 110, 111, ...
        let prices = forecast.prices();
        assert!((prices[0] - 110.0).abs() < 1e-9);
        assert!(prices.windows(2).all(|w| w[1] > w[0]));
        assert_ordered(&forecast);
    }

    #[test]
    fn test_six_feature_rows_select_polynomial() {
        // The first five closes only feed lags, so n closes give n - 5 rows.
        let forecaster = Forecaster::default();

        let five_rows = forecaster.forecast_values(&rising(10), &[1e6; 10]).unwrap();
        assert_eq!(five_rows.method, ForecastMethod::LinearTrend);
        assert_eq!(five_rows.points.len(), DEFAULT_HORIZON);
        assert_ordered(&five_rows);

        let six_rows = forecaster.forecast_values(&rising(11), &[1e6; 11]).unwrap();
        assert_eq!(six_rows.method, ForecastMethod::Polynomial);
        assert_eq!(six_rows.points.len(), DEFAULT_HORIZON);
        assert_ordered(&six_rows);
    }

    #[test]
    fn test_fallback_uses_recent_window_only() {
        // Crash then recovery; only the last 30 closes drive the line.
        let mut closes: Vec<f64> = (0..20).map(|i| 500.0 - i as f64 * 20.0).collect();
        closes.extend(rising(30));
        let forecaster = Forecaster::default();

        let prices = forecaster.linear_trend(&closes).unwrap();
        assert_eq!(prices.len(), 15);
        assert!((prices[0] - 130.0).abs() < 1e-9);
        assert!((prices[14] - 144.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_volumes_drop_rows() {
        let closes = rising(12);
        let mut volumes = vec![1e6; 12];
        for v in volumes.iter_mut().skip(5).take(4) {
            *v = f64::NAN;
        }
        // 7 candidate rows, 4 dropped: below the fit minimum.
        let forecaster = Forecaster::default();
        assert_eq!(
            forecaster.polynomial(&closes, &volumes),
            Err(ForecastError::InsufficientRows { rows: 3, required: 6 })
        );
        let forecast = forecaster.forecast_values(&closes, &volumes).unwrap();
        assert_eq!(forecast.method, ForecastMethod::LinearTrend);
    }

    #[test]
    fn test_single_close_projects_flat() {
        let forecast = Forecaster::new(3).forecast_values(&[42.0], &[1.0]).unwrap();
        assert_eq!(forecast.prices(), vec![42.0, 42.0, 42.0]);
        assert_eq!(forecast.volatility, 0.0);
        assert_ordered(&forecast);
    }

    #[test]
    fn test_prices_never_negative() {
        let closes: Vec<f64> = (0..10).map(|i| 50.0 - i as f64 * 5.0 + 0.1).collect();
        let forecast = Forecaster::default()
            .forecast_values(&closes, &[1e6; 10])
            .unwrap();

        assert!(forecast.prices().iter().all(|p| *p >= 0.0));
        assert_eq!(forecast.last().unwrap().price, 0.0);
        assert_ordered(&forecast);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            Forecaster::default().forecast(&PriceSeries::default()),
            Err(ForecastError::EmptySeries)
        );
        assert_eq!(
            Forecaster::new(0).forecast_values(&[1.0, 2.0], &[1.0, 1.0]),
            Err(ForecastError::ZeroHorizon)
        );
    }

    #[test]
    fn test_annualized_volatility() {
        // Alternating +/- r log returns: population std is exactly r.
        let r: f64 = 0.01;
        let closes: Vec<f64> = (0..31)
            .map(|i| 100.0 * if i % 2 == 0 { 1.0 } else { r.exp() })
            .collect();
        let vol = annualized_volatility(&closes, 31);
        assert!((vol - r * 252f64.sqrt()).abs() < 1e-9, "{vol}");

        // Only the trailing window counts.
        let mut noisy = vec![1.0, 1000.0, 1.0];
        noisy.extend(vec![100.0; 30]);
        assert_eq!(annualized_volatility(&noisy, 30), 0.0);

        assert_eq!(annualized_volatility(&[100.0; 5], 30), 0.0);
        assert_eq!(annualized_volatility(&[], 30), 0.0);
    }

    #[test]
    fn test_price_range() {
        let forecast = Forecaster::new(5)
            .forecast_values(&rising(10), &[1e6; 10])
            .unwrap();
        let (low, high) = forecast.price_range().unwrap();
        assert!((low - 110.0).abs() < 1e-9);
        assert!((high - 114.0).abs() < 1e-9);
    }
}
