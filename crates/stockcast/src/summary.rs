//! Text summary of a price forecast

use crate::analysis::{ConfidenceInterval, Forecast};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NO_DATA_MESSAGE: &str = "Unable to generate forecast summary - no data available.";
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Insufficient historical data for reliable forecasting.";
pub const TECHNICAL_ERROR_MESSAGE: &str =
    "Unable to generate forecast summary due to technical error.";

/// Volatility label from the size of the expected move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// High above 10 %, Medium above 5 %, otherwise Low
    pub fn from_return(expected_return_pct: f64) -> Self {
        let magnitude = expected_return_pct.abs();
        if magnitude > 10.0 {
            RiskLevel::High
        } else if magnitude > 5.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        })
    }
}

/// Headline numbers of a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub symbol: String,
    pub horizon: usize,
    pub current_price: f64,
    pub final_price: f64,
    pub expected_return_pct: f64,
    /// Band of the last forecast step
    pub interval: ConfidenceInterval,
    pub risk: RiskLevel,
    /// Lowest forecast price
    pub support: f64,
    /// Highest forecast price
    pub resistance: f64,
}

impl ForecastSummary {
    /// Summarize `forecast` relative to `current_price` (the last close).
    ///
    /// `None` when the forecast is empty or the current price is not a
    /// positive number.
    pub fn new(symbol: &str, current_price: f64, forecast: &Forecast) -> Option<Self> {
        if !(current_price.is_finite() && current_price > 0.0) {
            return None;
        }
        let last = forecast.last()?;
        let (support, resistance) = forecast.price_range()?;
        let expected_return_pct = (last.price / current_price - 1.0) * 100.0;

        Some(Self {
            symbol: symbol.to_uppercase(),
            horizon: forecast.points.len(),
            current_price,
            final_price: last.price,
            expected_return_pct,
            interval: last.interval,
            risk: RiskLevel::from_return(expected_return_pct),
            support,
            resistance,
        })
    }
}

impl fmt::Display for ForecastSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.horizon;
        writeln!(f, "**{days}-Day Price Forecast Summary for {}**", self.symbol)?;
        writeln!(f)?;
        writeln!(f, "- **Current Price**: ${:.2}", self.current_price)?;
        writeln!(f, "- **{days}-Day Forecast**: ${:.2}", self.final_price)?;
        writeln!(f, "- **Expected Return**: {:+.2}%", self.expected_return_pct)?;
        writeln!(f)?;
        writeln!(f, "**Confidence Interval (95%)**:")?;
        writeln!(f, "   - Lower Bound: ${:.2}", self.interval.lower)?;
        writeln!(f, "   - Upper Bound: ${:.2}", self.interval.upper)?;
        writeln!(f)?;
        writeln!(f, "**Risk Assessment**: {} volatility expected", self.risk)?;
        writeln!(f)?;
        writeln!(f, "**Key Levels to Watch**:")?;
        writeln!(f, "   - Support: ${:.2}", self.support)?;
        writeln!(f, "   - Resistance: ${:.2}", self.resistance)?;
        writeln!(f)?;
        write!(
            f,
            "*Note: This forecast is based on technical analysis and historical patterns. \
             Past performance does not guarantee future results.*"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ForecastMethod, ForecastPoint};

    fn forecast(prices: &[f64]) -> Forecast {
        Forecast {
            points: prices
                .iter()
                .enumerate()
                .map(|(i, &price)| ForecastPoint {
                    step: i + 1,
                    price,
                    interval: ConfidenceInterval {
                        lower: price * 0.9,
                        upper: price * 1.1,
                    },
                })
                .collect(),
            method: ForecastMethod::Polynomial,
            volatility: 0.2,
        }
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(RiskLevel::from_return(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_return(5.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_return(-5.01), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_return(10.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_return(-12.5), RiskLevel::High);
    }

    #[test]
    fn test_summary_numbers() {
        let summary = ForecastSummary::new("aapl", 100.0, &forecast(&[101.0, 99.0, 108.0])).unwrap();

        assert_eq!(summary.symbol, "AAPL");
        assert_eq!(summary.final_price, 108.0);
        assert!((summary.expected_return_pct - 8.0).abs() < 1e-9);
        assert_eq!(summary.risk, RiskLevel::Medium);
        assert_eq!(summary.support, 99.0);
        assert_eq!(summary.resistance, 108.0);
        assert!((summary.interval.upper - 118.8).abs() < 1e-9);
    }

    #[test]
    fn test_rendered_text() {
        let prices: Vec<f64> = (1..=15).map(|i| 200.0 - f64::from(i)).collect();
        let text = ForecastSummary::new("MSFT", 200.0, &forecast(&prices))
            .unwrap()
            .to_string();

        assert!(text.starts_with("**15-Day Price Forecast Summary for MSFT**"));
        assert!(text.contains("**Current Price**: $200.00"));
        assert!(text.contains("**15-Day Forecast**: $185.00"));
        assert!(text.contains("**Expected Return**: -7.50%"));
        assert!(text.contains("Lower Bound: $166.50"));
        assert!(text.contains("**Risk Assessment**: Medium volatility expected"));
        assert!(text.contains("Support: $185.00"));
        assert!(text.contains("Resistance: $199.00"));
        assert!(text.ends_with("does not guarantee future results.*"));
    }

    #[test]
    fn test_positive_return_has_sign() {
        let text = ForecastSummary::new("X", 10.0, &forecast(&[10.1]))
            .unwrap()
            .to_string();
        assert!(text.contains("+1.00%"));
        assert!(text.contains("Low volatility expected"));
    }

    #[test]
    fn test_unusable_inputs() {
        assert!(ForecastSummary::new("X", 0.0, &forecast(&[1.0])).is_none());
        assert!(ForecastSummary::new("X", f64::NAN, &forecast(&[1.0])).is_none());
        assert!(ForecastSummary::new("X", 10.0, &forecast(&[])).is_none());
    }
}
